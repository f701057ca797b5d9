use crate::dto::attempt_dto::{StudentExamView, SubmitExamRequest, SubmitExamResponse};
use crate::error::{Error, Result};
use crate::models::attempt::{ExamAttempt, Submission};
use crate::models::exam::ExamStatus;
use crate::models::identity::{Identity, Role};
use crate::services::exam_assembler::build_snapshot;
use crate::services::grading_service::GradingService;
use crate::store::{AttemptStore, ExamStore, QuestionBank};
use crate::utils::rng::SharedRng;
use crate::utils::validation::validate;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AttemptService {
    bank: Arc<dyn QuestionBank>,
    exams: Arc<dyn ExamStore>,
    attempts: Arc<dyn AttemptStore>,
    rng: SharedRng,
}

impl AttemptService {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        exams: Arc<dyn ExamStore>,
        attempts: Arc<dyn AttemptStore>,
        rng: SharedRng,
    ) -> Self {
        Self {
            bank,
            exams,
            attempts,
            rng,
        }
    }

    /// Freezes a snapshot for the caller and returns the student-facing view of it.
    ///
    /// A student with an unsubmitted attempt gets that attempt back instead of
    /// a fresh shuffle.
    pub async fn start_attempt(&self, exam_id: i64, identity: &Identity) -> Result<StudentExamView> {
        let exam = self.exams.get_exam(exam_id).await?;

        if identity.role == Role::Student {
            if exam.status != ExamStatus::Active {
                return Err(Error::BadRequest(format!(
                    "Exam {} is not open for attempts",
                    exam_id
                )));
            }
            if self
                .attempts
                .find_attempt(exam_id, &identity.user_id)
                .await?
                .is_some()
            {
                return Err(Error::Conflict(format!(
                    "Exam {} has already been submitted",
                    exam_id
                )));
            }
            // Resuming keeps the order and labels the student already saw.
            if let Some(open) = self
                .attempts
                .find_open_snapshot(exam_id, &identity.user_id)
                .await?
            {
                tracing::info!(
                    exam_id,
                    attempt_id = %open.attempt_id,
                    student_id = %identity.user_id,
                    "Attempt resumed"
                );
                return Ok(StudentExamView::from(&open));
            }
        }

        let pool = self.bank.list_questions(None).await?;
        let snapshot = {
            let mut rng = self.rng.lock()?;
            build_snapshot(
                &exam,
                &pool,
                &identity.user_id,
                Uuid::new_v4(),
                Utc::now(),
                &mut *rng,
            )?
        };

        let view = StudentExamView::from(&snapshot);
        self.attempts.save_snapshot(snapshot).await?;

        tracing::info!(
            exam_id,
            attempt_id = %view.attempt_id,
            student_id = %identity.user_id,
            questions = view.questions.len(),
            "Attempt started"
        );
        Ok(view)
    }

    /// Grades against the stored snapshot and records the result once.
    pub async fn submit(
        &self,
        req: SubmitExamRequest,
        identity: &Identity,
    ) -> Result<SubmitExamResponse> {
        validate(&req)?;
        let snapshot = self.attempts.get_snapshot(req.attempt_id).await?;
        if snapshot.student_id != identity.user_id {
            return Err(Error::Unauthorized(
                "Attempt belongs to another user".to_string(),
            ));
        }

        let now = Utc::now();
        let submission = Submission {
            exam_id: snapshot.exam_id,
            student_id: identity.user_id.clone(),
            answers: req.answers,
            switch_count: req.switch_count,
            submit_time: now,
        };
        let report = GradingService::grade(&snapshot, &submission);

        let exceeded = switch_limit_exceeded(snapshot.switch_limit, submission.switch_count);
        if exceeded {
            tracing::warn!(
                exam_id = snapshot.exam_id,
                student_id = %submission.student_id,
                switch_count = submission.switch_count,
                switch_limit = snapshot.switch_limit,
                "Switch limit exceeded"
            );
        }

        let attempt = self
            .attempts
            .record_attempt(ExamAttempt {
                id: snapshot.attempt_id,
                exam_id: snapshot.exam_id,
                student_id: submission.student_id,
                switch_count: submission.switch_count,
                switch_limit_exceeded: exceeded,
                total_score: report.total_score,
                max_score: report.max_score,
                correct_count: report.correct_count,
                report: report.questions,
                started_at: snapshot.created_at,
                submitted_at: now,
            })
            .await?;

        tracing::info!(
            exam_id = attempt.exam_id,
            attempt_id = %attempt.id,
            score = attempt.total_score,
            max_score = attempt.max_score,
            "Exam submitted"
        );
        Ok(attempt.into())
    }
}

/// A limit of 0 means unlimited.
pub fn switch_limit_exceeded(switch_limit: i32, switch_count: i32) -> bool {
    switch_limit > 0 && switch_count > switch_limit
}
