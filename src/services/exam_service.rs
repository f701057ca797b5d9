use crate::dto::exam_dto::{CreateExamPayload, CreateExamResponse, ReplaceQuestionsPayload};
use crate::error::{Error, Result};
use crate::models::exam::{Exam, ExamStatus, NewExam};
use crate::models::identity::{Identity, Role};
use crate::services::exam_assembler::{assemble, assemble_manual};
use crate::store::{ExamStore, QuestionBank};
use crate::utils::rng::SharedRng;
use crate::utils::validation::validate;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct ExamService {
    bank: Arc<dyn QuestionBank>,
    exams: Arc<dyn ExamStore>,
    rng: SharedRng,
    default_score: i32,
}

impl ExamService {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        exams: Arc<dyn ExamStore>,
        rng: SharedRng,
        default_score: i32,
    ) -> Self {
        Self {
            bank,
            exams,
            rng,
            default_score,
        }
    }

    /// Assembles and stores a new, inactive exam.
    ///
    /// Nothing is stored when assembly fails. Quota shortfalls do not fail
    /// creation; they are returned next to the exam.
    pub async fn create_exam(
        &self,
        payload: CreateExamPayload,
        identity: &Identity,
    ) -> Result<CreateExamResponse> {
        identity.require_teacher()?;
        validate(&payload)?;
        let criteria = payload.criteria()?;
        let default_score = payload.default_score.unwrap_or(self.default_score);

        let pool = self.bank.list_questions(None).await?;
        let categories = self.bank.list_categories().await?;

        let assembly = {
            let mut rng = self.rng.lock()?;
            assemble(&criteria, &pool, &categories, default_score, &mut *rng)?
        };

        for shortfall in &assembly.shortfalls {
            tracing::warn!(
                question_type = %shortfall.question_type,
                category = ?shortfall.category,
                requested = shortfall.requested,
                fulfilled = shortfall.fulfilled,
                "Quota shortfall while assembling exam"
            );
        }

        let exam = self
            .exams
            .create_exam(NewExam {
                title: payload.title,
                duration_minutes: payload.duration_minutes,
                switch_limit: payload.switch_limit,
                is_randomized: payload.is_randomized,
                questions: assembly.questions,
                created_by: identity.user_id.clone(),
            })
            .await?;

        tracing::info!(
            exam_id = exam.id,
            created_by = %exam.created_by,
            questions = exam.questions.len(),
            shortfalls = assembly.shortfalls.len(),
            "Exam created"
        );

        Ok(CreateExamResponse {
            exam,
            shortfalls: assembly.shortfalls,
        })
    }

    /// Discards the exam's question list and rebuilds it from `question_ids`.
    pub async fn replace_questions(
        &self,
        payload: ReplaceQuestionsPayload,
        identity: &Identity,
    ) -> Result<Exam> {
        identity.require_teacher()?;
        validate(&payload)?;
        let default_score = payload.default_score.unwrap_or(self.default_score);

        self.exams.get_exam(payload.exam_id).await?;
        let pool = self.bank.list_questions(None).await?;
        let assembly = assemble_manual(&payload.question_ids, &HashMap::new(), &pool, default_score)?;

        let ids = assembly.questions.iter().map(|q| q.question_id).collect();
        let exam = self
            .exams
            .replace_questions(payload.exam_id, ids, default_score)
            .await?;

        tracing::info!(
            exam_id = exam.id,
            questions = exam.questions.len(),
            "Exam question list replaced"
        );
        Ok(exam)
    }

    pub async fn toggle_status(&self, exam_id: i64, identity: &Identity) -> Result<Exam> {
        identity.require_teacher()?;
        let exam = self.exams.get_exam(exam_id).await?;
        let updated = self.exams.set_status(exam_id, exam.status.toggled()).await?;
        tracing::info!(exam_id, status = ?updated.status, "Exam status changed");
        Ok(updated)
    }

    /// Students only see active exams; an inactive one is reported as missing.
    pub async fn get_exam(&self, exam_id: i64, identity: &Identity) -> Result<Exam> {
        let exam = self.exams.get_exam(exam_id).await?;
        if identity.role == Role::Student && exam.status != ExamStatus::Active {
            return Err(Error::NotFound(format!("Exam {} not found", exam_id)));
        }
        Ok(exam)
    }

    pub async fn list_exams(&self, identity: &Identity) -> Result<Vec<Exam>> {
        let exams = self.exams.list_exams().await?;
        Ok(match identity.role {
            Role::Teacher => exams,
            Role::Student => exams
                .into_iter()
                .filter(|e| e.status == ExamStatus::Active)
                .collect(),
        })
    }
}
