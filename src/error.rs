use serde_json::{json, Value as JsonValue};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced question id is not present in the question pool.
    #[error("Unknown question: {0}")]
    UnknownQuestion(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable code reported in the command protocol's error object.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::UnknownQuestion(_) => "unknown_question",
            Error::InvalidConfiguration(_) => "invalid_configuration",
            Error::Validation(_) => "validation",
            Error::Json(_) => "bad_json",
            Error::Anyhow(_) => "bad_request",
            Error::Internal(_) | Error::Io(_) => "internal",
        }
    }

    /// Converts the error into the `error` object of a protocol response.
    ///
    /// Internal failures are logged and reported with a generic message.
    pub fn to_json(&self) -> JsonValue {
        let message = match self {
            Error::Internal(_) | Error::Io(_) => {
                tracing::error!(error = %self, "Internal error while handling request");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "code": self.code(),
            "message": message,
        });
        if let Error::UnknownQuestion(id) = self {
            body["details"] = json!({ "question_id": id });
        }
        body
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::Internal(format!("Lock poisoned: {}", err))
    }
}
