use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Raw option data as stored: a list, a keyed map, or a JSON-encoded string of either.
    #[serde(default)]
    pub options: Option<JsonValue>,
    /// Raw correct answer as stored; see `services::answer_canonicalizer`.
    #[serde(default)]
    pub correct_answer: JsonValue,
    #[serde(default = "default_score")]
    pub default_score: i32,
}

fn default_score() -> i32 {
    5
}

/// Types are declared in the order random-mode exams concatenate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Single,
    Multiple,
    #[serde(alias = "true_false")]
    Boolean,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::Single,
        QuestionType::Multiple,
        QuestionType::Boolean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Single => "single",
            QuestionType::Multiple => "multiple",
            QuestionType::Boolean => "boolean",
        }
    }

    pub fn has_options(&self) -> bool {
        !matches!(self, QuestionType::Boolean)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub question_type: Option<QuestionType>,
    pub category_id: Option<i64>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        self.question_type.map_or(true, |t| t == question.question_type)
            && self
                .category_id
                .map_or(true, |c| question.category_id == Some(c))
    }
}
