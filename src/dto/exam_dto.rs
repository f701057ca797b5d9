use crate::error::{Error, Result};
use crate::models::exam::Exam;
use crate::services::exam_assembler::AssemblyCriteria;
use crate::services::quota_resolver::{parse_config, QuotaShortfall, RawRandomConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExamPayload {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Switch limit cannot be negative"))]
    pub switch_limit: i32,
    #[serde(default)]
    pub is_randomized: bool,
    #[validate(range(min = 1, max = 1000, message = "Score must be between 1 and 1000"))]
    pub default_score: Option<i32>,
    /// Manual mode: ids in display order.
    pub question_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub score_overrides: HashMap<i64, i32>,
    /// Random mode.
    pub random_config: Option<RawRandomConfig>,
}

impl CreateExamPayload {
    pub fn criteria(&self) -> Result<AssemblyCriteria> {
        match (&self.question_ids, &self.random_config) {
            (Some(_), Some(_)) => Err(Error::BadRequest(
                "Provide either question_ids or random_config, not both".to_string(),
            )),
            (None, None) => Err(Error::BadRequest(
                "Either question_ids or random_config is required".to_string(),
            )),
            (Some(ids), None) => Ok(AssemblyCriteria::Manual {
                question_ids: ids.clone(),
                score_overrides: self.score_overrides.clone(),
            }),
            (None, Some(config)) => Ok(AssemblyCriteria::Random(parse_config(config.clone())?)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplaceQuestionsPayload {
    pub exam_id: i64,
    pub question_ids: Vec<i64>,
    #[validate(range(min = 1, max = 1000, message = "Score must be between 1 and 1000"))]
    pub default_score: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExamIdPayload {
    pub exam_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateExamResponse {
    pub exam: Exam,
    pub shortfalls: Vec<QuotaShortfall>,
}
