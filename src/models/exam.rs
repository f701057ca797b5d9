use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Active,
    Inactive,
}

impl ExamStatus {
    pub fn toggled(self) -> Self {
        match self {
            ExamStatus::Active => ExamStatus::Inactive,
            ExamStatus::Inactive => ExamStatus::Active,
        }
    }
}

/// One question included in an exam, with the score it is worth there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub question_id: i64,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i32,
    /// 0 means unlimited.
    pub switch_limit: i32,
    /// Controls per-view shuffling, not selection.
    pub is_randomized: bool,
    pub status: ExamStatus,
    pub questions: Vec<ExamQuestion>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exam {
    pub fn max_score(&self) -> i32 {
        self.questions
            .iter()
            .fold(0i32, |acc, q| acc.saturating_add(q.score))
    }
}

/// Definition handed to the exam store on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExam {
    pub title: String,
    pub duration_minutes: i32,
    pub switch_limit: i32,
    pub is_randomized: bool,
    pub questions: Vec<ExamQuestion>,
    pub created_by: String,
}
