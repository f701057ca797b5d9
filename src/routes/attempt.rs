use crate::dto::attempt_dto::{StartAttemptPayload, StudentExamView, SubmitExamRequest, SubmitExamResponse};
use crate::error::Result;
use crate::routes::{caller, parse_params, respond, Request};
use crate::AppState;
use serde_json::Value as JsonValue;

pub async fn try_handle(state: &AppState, req: &Request) -> Option<JsonValue> {
    let resp = match req.method.as_str() {
        "attempts.start" => respond(&req.id, start(state, req).await),
        "attempts.submit" => respond(&req.id, submit(state, req).await),
        _ => return None,
    };
    Some(resp)
}

async fn start(state: &AppState, req: &Request) -> Result<StudentExamView> {
    let identity = caller(req)?;
    let StartAttemptPayload { exam_id } = parse_params(req)?;
    state.attempt_service.start_attempt(exam_id, identity).await
}

async fn submit(state: &AppState, req: &Request) -> Result<SubmitExamResponse> {
    let identity = caller(req)?;
    let payload: SubmitExamRequest = parse_params(req)?;
    state.attempt_service.submit(payload, identity).await
}
