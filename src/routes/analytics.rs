use crate::dto::analytics_dto::{ExamStatistics, StudentPerformance, StudentPerformanceQuery, TeacherOverview};
use crate::dto::exam_dto::ExamIdPayload;
use crate::error::Result;
use crate::routes::{caller, parse_params, respond, Request};
use crate::AppState;
use serde_json::Value as JsonValue;

pub async fn try_handle(state: &AppState, req: &Request) -> Option<JsonValue> {
    let resp = match req.method.as_str() {
        "analytics.exam" => respond(&req.id, exam(state, req).await),
        "analytics.student" => respond(&req.id, student(state, req).await),
        "analytics.overview" => respond(&req.id, overview(state, req).await),
        _ => return None,
    };
    Some(resp)
}

async fn exam(state: &AppState, req: &Request) -> Result<ExamStatistics> {
    let identity = caller(req)?;
    let ExamIdPayload { exam_id } = parse_params(req)?;
    state.analytics_service.exam_statistics(exam_id, identity).await
}

async fn student(state: &AppState, req: &Request) -> Result<StudentPerformance> {
    let identity = caller(req)?;
    let query: StudentPerformanceQuery = if req.params.is_null() {
        StudentPerformanceQuery { student_id: None }
    } else {
        parse_params(req)?
    };
    state
        .analytics_service
        .student_performance(query.student_id, identity)
        .await
}

async fn overview(state: &AppState, req: &Request) -> Result<TeacherOverview> {
    let identity = caller(req)?;
    state.analytics_service.teacher_overview(identity).await
}
