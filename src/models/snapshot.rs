use crate::models::answer::CanonicalAnswer;
use crate::models::question::QuestionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fully resolved exam shown to one student for one attempt.
///
/// Option order and labels are frozen here; grading compares against the
/// labels captured in this snapshot and never regenerates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSnapshot {
    #[serde(default)]
    pub attempt_id: Uuid,
    pub exam_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub switch_limit: i32,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    pub questions: Vec<SnapshotQuestion>,
}

impl ExamSnapshot {
    pub fn max_score(&self) -> i32 {
        self.questions
            .iter()
            .fold(0i32, |acc, q| acc.saturating_add(q.score))
    }

    pub fn question(&self, question_id: i64) -> Option<&SnapshotQuestion> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotQuestion {
    pub question_id: i64,
    pub question_type: QuestionType,
    #[serde(default)]
    pub question_text: String,
    pub score: i32,
    /// Empty for boolean questions.
    #[serde(default)]
    pub options: Vec<DisplayedOption>,
    /// Expressed in the displayed labels of `options`.
    pub correct_answer: CanonicalAnswer,
}

/// An option as rendered for this attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayedOption {
    pub label: String,
    pub text: String,
    /// Label the option carries in the question bank.
    pub source_label: String,
}
