use crate::models::answer::CanonicalAnswer;
use crate::models::question::QuestionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StudentPerformanceQuery {
    /// Defaults to the caller.
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamStatistics {
    pub exam_id: i64,
    pub title: String,
    pub total_questions: usize,
    pub duration_minutes: i32,
    pub participants: usize,
    pub submissions: usize,
    pub average_score: f64,
    pub min_score: i32,
    pub max_score: i32,
    pub score_distribution: Vec<ScoreBand>,
    pub question_accuracy: Vec<QuestionAccuracy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBand {
    pub grade_range: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionAccuracy {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_count: usize,
    pub total_count: usize,
    /// Percentage, two decimals.
    pub accuracy_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentPerformance {
    pub student_id: String,
    pub total_exams: usize,
    pub average_score: f64,
    pub highest_score: i32,
    pub lowest_score: i32,
    pub exam_history: Vec<ExamHistoryEntry>,
    pub wrong_questions: Vec<WrongAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamHistoryEntry {
    pub exam_id: i64,
    pub exam_title: String,
    pub score: i32,
    pub max_score: i32,
    pub duration_minutes: i32,
    pub total_questions: usize,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrongAnswer {
    pub exam_id: i64,
    pub exam_title: String,
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_answer: CanonicalAnswer,
    pub submitted_answer: CanonicalAnswer,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherOverview {
    pub total_exams: usize,
    pub active_exams: usize,
    pub inactive_exams: usize,
    pub total_questions: usize,
    pub questions_by_type: Vec<TypeCount>,
    pub total_students: usize,
    pub recent_activity: Vec<RecentSubmission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub question_type: QuestionType,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSubmission {
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: String,
    pub score: i32,
    pub max_score: i32,
    pub submitted_at: DateTime<Utc>,
}
