use crate::models::question::QuestionType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The only answer form the grading engine compares.
///
/// Serialized untagged: a letter string, an array of letters, or a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalAnswer {
    Boolean(bool),
    Single(String),
    Multiple(BTreeSet<String>),
}

impl CanonicalAnswer {
    /// What a missing submission canonicalizes to.
    pub fn empty(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Single => CanonicalAnswer::Single(String::new()),
            QuestionType::Multiple => CanonicalAnswer::Multiple(BTreeSet::new()),
            QuestionType::Boolean => CanonicalAnswer::Boolean(false),
        }
    }

    /// Letters referenced by a choice answer. Empty for booleans.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            CanonicalAnswer::Single(label) if !label.is_empty() => vec![label.as_str()],
            CanonicalAnswer::Multiple(labels) => labels.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Whether a raw value is the stored correct answer or a student's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRole {
    StoredCorrect,
    Submitted,
}
