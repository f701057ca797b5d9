use crate::models::attempt::{deserialize_answers, ExamAttempt, GradedQuestion, Submission, SubmittedAnswer};
use crate::models::option::OptionItem;
use crate::models::question::QuestionType;
use crate::models::snapshot::ExamSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StartAttemptPayload {
    pub exam_id: i64,
}

/// What a student sees for one attempt: no correct answers, no bank labels.
#[derive(Debug, Clone, Serialize)]
pub struct StudentExamView {
    pub attempt_id: Uuid,
    pub exam_id: i64,
    pub title: String,
    pub duration_minutes: i32,
    pub switch_limit: i32,
    pub started_at: DateTime<Utc>,
    pub max_score: i32,
    pub questions: Vec<StudentQuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentQuestionView {
    pub question_id: i64,
    pub question_type: QuestionType,
    pub question_text: String,
    pub score: i32,
    pub options: Vec<OptionItem>,
}

impl From<&ExamSnapshot> for StudentExamView {
    fn from(snapshot: &ExamSnapshot) -> Self {
        Self {
            attempt_id: snapshot.attempt_id,
            exam_id: snapshot.exam_id,
            title: snapshot.title.clone(),
            duration_minutes: snapshot.duration_minutes,
            switch_limit: snapshot.switch_limit,
            started_at: snapshot.created_at,
            max_score: snapshot.max_score(),
            questions: snapshot
                .questions
                .iter()
                .map(|q| StudentQuestionView {
                    question_id: q.question_id,
                    question_type: q.question_type,
                    question_text: q.question_text.clone(),
                    score: q.score,
                    options: q
                        .options
                        .iter()
                        .map(|o| OptionItem::new(o.label.clone(), o.text.clone()))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitExamRequest {
    pub attempt_id: Uuid,
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Switch count cannot be negative"))]
    pub switch_count: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitExamResponse {
    pub attempt_id: Uuid,
    pub exam_id: i64,
    pub total_score: i32,
    pub max_score: i32,
    pub correct_count: usize,
    pub switch_count: i32,
    pub switch_limit_exceeded: bool,
    pub submitted_at: DateTime<Utc>,
    pub questions: Vec<GradedQuestion>,
}

impl From<ExamAttempt> for SubmitExamResponse {
    fn from(attempt: ExamAttempt) -> Self {
        Self {
            attempt_id: attempt.id,
            exam_id: attempt.exam_id,
            total_score: attempt.total_score,
            max_score: attempt.max_score,
            correct_count: attempt.correct_count,
            switch_count: attempt.switch_count,
            switch_limit_exceeded: attempt.switch_limit_exceeded,
            submitted_at: attempt.submitted_at,
            questions: attempt.report,
        }
    }
}

/// Pure grading input for callers that keep snapshots themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeRequest {
    pub snapshot: ExamSnapshot,
    pub submission: Submission,
}
