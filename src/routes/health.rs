use crate::routes::{ok, Request};
use serde_json::{json, Value as JsonValue};

pub fn try_handle(req: &Request) -> Option<JsonValue> {
    match req.method.as_str() {
        "health" => Some(ok(
            &req.id,
            json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )),
        _ => None,
    }
}
