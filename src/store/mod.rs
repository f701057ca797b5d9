//! Collaborator contracts the engine reads from and hands results to.
//!
//! The engine never writes to the question bank. Exam and attempt stores own
//! durability; `record_attempt` must keep at most one record per exam and student.

pub mod memory;

use crate::error::Result;
use crate::models::attempt::ExamAttempt;
use crate::models::exam::{Exam, ExamStatus, NewExam};
use crate::models::question::{Category, Question, QuestionFilter};
use crate::models::snapshot::ExamSnapshot;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn list_questions(&self, filter: Option<QuestionFilter>) -> Result<Vec<Question>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn create_exam(&self, definition: NewExam) -> Result<Exam>;
    /// Discards the exam's question list and stores `ids` in order, each worth `default_score`.
    async fn replace_questions(&self, exam_id: i64, ids: Vec<i64>, default_score: i32)
        -> Result<Exam>;
    async fn get_exam(&self, exam_id: i64) -> Result<Exam>;
    async fn list_exams(&self) -> Result<Vec<Exam>>;
    async fn set_status(&self, exam_id: i64, status: ExamStatus) -> Result<Exam>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn save_snapshot(&self, snapshot: ExamSnapshot) -> Result<()>;
    async fn get_snapshot(&self, attempt_id: Uuid) -> Result<ExamSnapshot>;
    /// A snapshot the student started for the exam but has not submitted yet.
    async fn find_open_snapshot(&self, exam_id: i64, student_id: &str)
        -> Result<Option<ExamSnapshot>>;
    /// Fails with `Conflict` when the student already has a record for the exam.
    async fn record_attempt(&self, attempt: ExamAttempt) -> Result<ExamAttempt>;
    async fn find_attempt(&self, exam_id: i64, student_id: &str) -> Result<Option<ExamAttempt>>;
    async fn list_attempts(
        &self,
        exam_id: Option<i64>,
        student_id: Option<String>,
    ) -> Result<Vec<ExamAttempt>>;
}
