//! JSON command dispatch: one request object in, one response object out.
//!
//! Request: `{"id", "method", "params", "identity"}`.
//! Response: `{"id", "ok": true, "result"}` or `{"id", "ok": false, "error": {"code", "message", "details"?}}`.

pub mod analytics;
pub mod attempt;
pub mod exam;
pub mod grading;
pub mod health;

use crate::error::{Error, Result};
use crate::models::identity::Identity;
use crate::AppState;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: JsonValue,
    #[serde(default)]
    pub identity: Option<Identity>,
}

pub fn ok(id: &str, result: JsonValue) -> JsonValue {
    json!({
        "id": id,
        "ok": true,
        "result": result,
    })
}

pub fn err(id: &str, error: JsonValue) -> JsonValue {
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub async fn handle_request(state: &AppState, req: Request) -> JsonValue {
    tracing::debug!(id = %req.id, method = %req.method, "Handling request");

    if let Some(resp) = health::try_handle(&req) {
        return resp;
    }
    if let Some(resp) = exam::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = attempt::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = grading::try_handle(&req) {
        return resp;
    }
    if let Some(resp) = analytics::try_handle(state, &req).await {
        return resp;
    }

    err(
        &req.id,
        json!({
            "code": "unknown_method",
            "message": format!("Unknown method: {}", req.method),
        }),
    )
}

pub(crate) fn respond<T: Serialize>(id: &str, result: Result<T>) -> JsonValue {
    match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
        Ok(value) => ok(id, value),
        Err(e) => {
            tracing::debug!(id, code = e.code(), error = %e, "Request failed");
            err(id, e.to_json())
        }
    }
}

pub(crate) fn parse_params<T: DeserializeOwned>(req: &Request) -> Result<T> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| Error::BadRequest(format!("Invalid params for {}: {}", req.method, e)))
}

pub(crate) fn caller(req: &Request) -> Result<&Identity> {
    req.identity
        .as_ref()
        .ok_or_else(|| Error::Unauthorized("Missing identity".to_string()))
}
