use crate::dto::exam_dto::{CreateExamPayload, CreateExamResponse, ExamIdPayload, ReplaceQuestionsPayload};
use crate::error::Result;
use crate::models::exam::Exam;
use crate::routes::{caller, parse_params, respond, Request};
use crate::AppState;
use serde_json::Value as JsonValue;

pub async fn try_handle(state: &AppState, req: &Request) -> Option<JsonValue> {
    let resp = match req.method.as_str() {
        "exams.create" => respond(&req.id, create(state, req).await),
        "exams.replace_questions" => respond(&req.id, replace_questions(state, req).await),
        "exams.toggle" => respond(&req.id, toggle(state, req).await),
        "exams.get" => respond(&req.id, get(state, req).await),
        "exams.list" => respond(&req.id, list(state, req).await),
        _ => return None,
    };
    Some(resp)
}

async fn create(state: &AppState, req: &Request) -> Result<CreateExamResponse> {
    let identity = caller(req)?;
    let payload: CreateExamPayload = parse_params(req)?;
    state.exam_service.create_exam(payload, identity).await
}

async fn replace_questions(state: &AppState, req: &Request) -> Result<Exam> {
    let identity = caller(req)?;
    let payload: ReplaceQuestionsPayload = parse_params(req)?;
    state.exam_service.replace_questions(payload, identity).await
}

async fn toggle(state: &AppState, req: &Request) -> Result<Exam> {
    let identity = caller(req)?;
    let ExamIdPayload { exam_id } = parse_params(req)?;
    state.exam_service.toggle_status(exam_id, identity).await
}

async fn get(state: &AppState, req: &Request) -> Result<Exam> {
    let identity = caller(req)?;
    let ExamIdPayload { exam_id } = parse_params(req)?;
    state.exam_service.get_exam(exam_id, identity).await
}

async fn list(state: &AppState, req: &Request) -> Result<Vec<Exam>> {
    let identity = caller(req)?;
    state.exam_service.list_exams(identity).await
}
