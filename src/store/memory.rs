use crate::error::{Error, Result};
use crate::models::attempt::ExamAttempt;
use crate::models::exam::{Exam, ExamQuestion, ExamStatus, NewExam};
use crate::models::question::{Category, Question, QuestionFilter};
use crate::models::snapshot::ExamSnapshot;
use crate::store::{AttemptStore, ExamStore, QuestionBank};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Contents of a question bank seed file.
#[derive(Debug, Default, Deserialize)]
pub struct BankFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Process-local store backing every collaborator trait.
#[derive(Default)]
pub struct InMemoryStore {
    questions: RwLock<BTreeMap<i64, Question>>,
    categories: RwLock<BTreeMap<i64, Category>>,
    exams: RwLock<BTreeMap<i64, Exam>>,
    next_exam_id: AtomicI64,
    snapshots: RwLock<HashMap<Uuid, ExamSnapshot>>,
    attempts: RwLock<Vec<ExamAttempt>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn from_bank_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let bank: BankFile = serde_json::from_str(&raw)?;
        let store = Self::new();
        store.load_bank(bank).await;
        Ok(store)
    }

    pub async fn load_bank(&self, bank: BankFile) {
        let mut categories = self.categories.write().await;
        for c in bank.categories {
            categories.insert(c.id, c);
        }
        drop(categories);

        let mut questions = self.questions.write().await;
        for q in bank.questions {
            questions.insert(q.id, q);
        }
        tracing::info!(
            questions = questions.len(),
            "Question bank loaded"
        );
    }

    pub async fn insert_question(&self, question: Question) {
        self.questions.write().await.insert(question.id, question);
    }

    pub async fn insert_category(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    pub async fn remove_question(&self, question_id: i64) -> bool {
        self.questions.write().await.remove(&question_id).is_some()
    }

    fn exam_not_found(exam_id: i64) -> Error {
        Error::NotFound(format!("Exam {} not found", exam_id))
    }
}

#[async_trait]
impl QuestionBank for InMemoryStore {
    async fn list_questions(&self, filter: Option<QuestionFilter>) -> Result<Vec<Question>> {
        let filter = filter.unwrap_or_default();
        Ok(self
            .questions
            .read()
            .await
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl ExamStore for InMemoryStore {
    async fn create_exam(&self, definition: NewExam) -> Result<Exam> {
        let id = self.next_exam_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let exam = Exam {
            id,
            title: definition.title,
            duration_minutes: definition.duration_minutes,
            switch_limit: definition.switch_limit,
            is_randomized: definition.is_randomized,
            status: ExamStatus::Inactive,
            questions: definition.questions,
            created_by: definition.created_by,
            created_at: now,
            updated_at: now,
        };
        self.exams.write().await.insert(id, exam.clone());
        Ok(exam)
    }

    async fn replace_questions(
        &self,
        exam_id: i64,
        ids: Vec<i64>,
        default_score: i32,
    ) -> Result<Exam> {
        let mut exams = self.exams.write().await;
        let exam = exams
            .get_mut(&exam_id)
            .ok_or_else(|| Self::exam_not_found(exam_id))?;
        exam.questions = ids
            .into_iter()
            .map(|question_id| ExamQuestion {
                question_id,
                score: default_score,
            })
            .collect();
        exam.updated_at = Utc::now();
        Ok(exam.clone())
    }

    async fn get_exam(&self, exam_id: i64) -> Result<Exam> {
        self.exams
            .read()
            .await
            .get(&exam_id)
            .cloned()
            .ok_or_else(|| Self::exam_not_found(exam_id))
    }

    async fn list_exams(&self) -> Result<Vec<Exam>> {
        Ok(self.exams.read().await.values().rev().cloned().collect())
    }

    async fn set_status(&self, exam_id: i64, status: ExamStatus) -> Result<Exam> {
        let mut exams = self.exams.write().await;
        let exam = exams
            .get_mut(&exam_id)
            .ok_or_else(|| Self::exam_not_found(exam_id))?;
        exam.status = status;
        exam.updated_at = Utc::now();
        Ok(exam.clone())
    }
}

#[async_trait]
impl AttemptStore for InMemoryStore {
    async fn save_snapshot(&self, snapshot: ExamSnapshot) -> Result<()> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.attempt_id, snapshot);
        Ok(())
    }

    async fn get_snapshot(&self, attempt_id: Uuid) -> Result<ExamSnapshot> {
        self.snapshots
            .read()
            .await
            .get(&attempt_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))
    }

    async fn find_open_snapshot(
        &self,
        exam_id: i64,
        student_id: &str,
    ) -> Result<Option<ExamSnapshot>> {
        let attempts = self.attempts.read().await;
        Ok(self
            .snapshots
            .read()
            .await
            .values()
            .filter(|s| s.exam_id == exam_id && s.student_id == student_id)
            .filter(|s| !attempts.iter().any(|a| a.id == s.attempt_id))
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn record_attempt(&self, attempt: ExamAttempt) -> Result<ExamAttempt> {
        let mut attempts = self.attempts.write().await;
        if attempts
            .iter()
            .any(|a| a.exam_id == attempt.exam_id && a.student_id == attempt.student_id)
        {
            return Err(Error::Conflict(format!(
                "Student {} has already submitted exam {}",
                attempt.student_id, attempt.exam_id
            )));
        }
        attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(&self, exam_id: i64, student_id: &str) -> Result<Option<ExamAttempt>> {
        Ok(self
            .attempts
            .read()
            .await
            .iter()
            .find(|a| a.exam_id == exam_id && a.student_id == student_id)
            .cloned())
    }

    async fn list_attempts(
        &self,
        exam_id: Option<i64>,
        student_id: Option<String>,
    ) -> Result<Vec<ExamAttempt>> {
        let mut rows: Vec<ExamAttempt> = self
            .attempts
            .read()
            .await
            .iter()
            .filter(|a| exam_id.map_or(true, |id| a.exam_id == id))
            .filter(|a| student_id.as_deref().map_or(true, |s| a.student_id == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use serde_json::json;

    fn new_exam(title: &str) -> NewExam {
        NewExam {
            title: title.into(),
            duration_minutes: 30,
            switch_limit: 0,
            is_randomized: false,
            questions: vec![ExamQuestion { question_id: 1, score: 5 }],
            created_by: "t1".into(),
        }
    }

    #[tokio::test]
    async fn exams_get_sequential_ids_and_start_inactive() {
        let store = InMemoryStore::new();
        let first = store.create_exam(new_exam("one")).await.unwrap();
        let second = store.create_exam(new_exam("two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, ExamStatus::Inactive);

        let listed = store.list_exams().await.unwrap();
        assert_eq!(listed[0].id, 2, "newest first");
    }

    #[tokio::test]
    async fn replace_discards_previous_list() {
        let store = InMemoryStore::new();
        let exam = store.create_exam(new_exam("one")).await.unwrap();
        let updated = store.replace_questions(exam.id, vec![4, 2], 3).await.unwrap();

        assert_eq!(
            updated.questions,
            vec![
                ExamQuestion { question_id: 4, score: 3 },
                ExamQuestion { question_id: 2, score: 3 },
            ]
        );
        assert!(matches!(
            store.replace_questions(99, vec![], 1).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn open_snapshot_closes_once_recorded() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let snapshot = ExamSnapshot {
            attempt_id: Uuid::new_v4(),
            exam_id: 1,
            title: "one".into(),
            duration_minutes: 30,
            switch_limit: 0,
            student_id: "s1".into(),
            created_at: now,
            questions: Vec::new(),
        };
        store.save_snapshot(snapshot.clone()).await.unwrap();

        let open = store.find_open_snapshot(1, "s1").await.unwrap();
        assert_eq!(open.map(|s| s.attempt_id), Some(snapshot.attempt_id));
        assert!(store.find_open_snapshot(1, "s2").await.unwrap().is_none());

        store
            .record_attempt(ExamAttempt {
                id: snapshot.attempt_id,
                exam_id: 1,
                student_id: "s1".into(),
                switch_count: 0,
                switch_limit_exceeded: false,
                total_score: 0,
                max_score: 0,
                correct_count: 0,
                report: Vec::new(),
                started_at: now,
                submitted_at: now,
            })
            .await
            .unwrap();
        assert!(store.find_open_snapshot(1, "s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn question_filter_is_applied() {
        let store = InMemoryStore::new();
        store
            .load_bank(BankFile {
                categories: vec![Category { id: 1, name: "basics".into() }],
                questions: serde_json::from_value(json!([
                    { "id": 1, "question_text": "a", "question_type": "single",
                      "category_id": 1, "options": ["x"], "correct_answer": "A" },
                    { "id": 2, "question_text": "b", "question_type": "true_false",
                      "correct_answer": true }
                ]))
                .unwrap(),
            })
            .await;

        let singles = store
            .list_questions(Some(QuestionFilter {
                question_type: Some(QuestionType::Single),
                category_id: None,
            }))
            .await
            .unwrap();
        assert_eq!(singles.len(), 1);
        assert_eq!(store.list_questions(None).await.unwrap().len(), 2);
        assert_eq!(store.list_categories().await.unwrap()[0].name, "basics");
    }
}
