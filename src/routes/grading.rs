use crate::dto::attempt_dto::GradeRequest;
use crate::error::Result;
use crate::models::attempt::GradeReport;
use crate::routes::{parse_params, respond, Request};
use crate::services::grading_service::GradingService;
use serde_json::Value as JsonValue;

/// Stateless: grades a caller-supplied snapshot without touching any store.
pub fn try_handle(req: &Request) -> Option<JsonValue> {
    match req.method.as_str() {
        "grading.grade" => Some(respond(&req.id, grade(req))),
        _ => None,
    }
}

fn grade(req: &Request) -> Result<GradeReport> {
    let GradeRequest { snapshot, submission } = parse_params(req)?;
    Ok(GradingService::grade(&snapshot, &submission))
}
