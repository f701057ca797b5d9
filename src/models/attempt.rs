use crate::models::answer::CanonicalAnswer;
use crate::models::question::QuestionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    #[serde(default)]
    pub answer: JsonValue,
}

/// A student's raw answer submission for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub exam_id: i64,
    #[serde(default)]
    pub student_id: String,
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub switch_count: i32,
    #[serde(default = "Utc::now")]
    pub submit_time: DateTime<Utc>,
}

impl Submission {
    /// First answer submitted for `question_id`, if any.
    pub fn answer_for(&self, question_id: i64) -> Option<&JsonValue> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| &a.answer)
    }
}

/// Accepts either `[{question_id, answer}, ...]` or `{"<question_id>": answer, ...}`.
///
/// Question ids may be integers or numeric strings; entries whose id cannot be
/// read are skipped.
pub fn deserialize_answers<'de, D>(deserializer: D) -> Result<Vec<SubmittedAnswer>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    Ok(answers_from_value(raw))
}

pub fn answers_from_value(raw: JsonValue) -> Vec<SubmittedAnswer> {
    match raw {
        JsonValue::Object(map) => map
            .into_iter()
            .filter_map(|(key, answer)| {
                key.trim()
                    .parse::<i64>()
                    .ok()
                    .map(|question_id| SubmittedAnswer { question_id, answer })
            })
            .collect(),
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let question_id = match item.get("question_id")? {
                    JsonValue::Number(n) => n.as_i64()?,
                    JsonValue::String(s) => s.trim().parse().ok()?,
                    _ => return None,
                };
                let answer = item.get("answer").cloned().unwrap_or(JsonValue::Null);
                Some(SubmittedAnswer { question_id, answer })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Per-question outcome shown on review and analytics screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedQuestion {
    pub question_id: i64,
    pub question_type: QuestionType,
    pub correct_answer: CanonicalAnswer,
    pub submitted_answer: CanonicalAnswer,
    pub is_correct: bool,
    pub points_earned: i32,
    pub max_points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub total_score: i32,
    pub max_score: i32,
    pub correct_count: usize,
    pub questions: Vec<GradedQuestion>,
}

/// The persisted scoring record of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub id: Uuid,
    pub exam_id: i64,
    pub student_id: String,
    pub switch_count: i32,
    pub switch_limit_exceeded: bool,
    pub total_score: i32,
    pub max_score: i32,
    pub correct_count: usize,
    pub report: Vec<GradedQuestion>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}
