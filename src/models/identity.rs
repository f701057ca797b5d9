use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Student,
}

/// Caller identity, passed explicitly into every entry point. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn teacher(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Teacher,
        }
    }

    pub fn student(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Student,
        }
    }

    pub fn require_teacher(&self) -> crate::error::Result<()> {
        if self.role != Role::Teacher {
            return Err(crate::error::Error::Unauthorized(
                "Teacher role required".to_string(),
            ));
        }
        Ok(())
    }
}
