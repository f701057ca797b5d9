//! Read-only aggregates over recorded attempts.

use crate::dto::analytics_dto::{
    ExamHistoryEntry, ExamStatistics, QuestionAccuracy, RecentSubmission, ScoreBand,
    StudentPerformance, TeacherOverview, TypeCount, WrongAnswer,
};
use crate::error::{Error, Result};
use crate::models::attempt::ExamAttempt;
use crate::models::exam::{Exam, ExamStatus};
use crate::models::identity::{Identity, Role};
use crate::models::question::{Question, QuestionType};
use crate::store::{AttemptStore, ExamStore, QuestionBank};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const STATS_TEXT_LIMIT: usize = 50;
const WRONG_TEXT_LIMIT: usize = 100;
const WRONG_ANSWER_LIMIT: usize = 20;
const RECENT_LIMIT: usize = 10;

/// Percentage bands, highest first.
const BANDS: [(f64, &str); 5] = [
    (90.0, "90-100"),
    (80.0, "80-89"),
    (70.0, "70-79"),
    (60.0, "60-69"),
    (0.0, "0-59"),
];

#[derive(Clone)]
pub struct AnalyticsService {
    bank: Arc<dyn QuestionBank>,
    exams: Arc<dyn ExamStore>,
    attempts: Arc<dyn AttemptStore>,
}

impl AnalyticsService {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        exams: Arc<dyn ExamStore>,
        attempts: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            bank,
            exams,
            attempts,
        }
    }

    pub async fn exam_statistics(&self, exam_id: i64, identity: &Identity) -> Result<ExamStatistics> {
        identity.require_teacher()?;
        let exam = self.exams.get_exam(exam_id).await?;
        let attempts = self.attempts.list_attempts(Some(exam_id), None).await?;
        let questions = self.bank.list_questions(None).await?;
        Ok(summarize_exam(&exam, &attempts, &index(&questions)))
    }

    /// Teachers may look at anyone; students only at themselves.
    pub async fn student_performance(
        &self,
        student_id: Option<String>,
        identity: &Identity,
    ) -> Result<StudentPerformance> {
        let student_id = student_id.unwrap_or_else(|| identity.user_id.clone());
        if identity.role == Role::Student && student_id != identity.user_id {
            return Err(Error::Unauthorized(
                "Students may only view their own performance".to_string(),
            ));
        }

        let attempts = self
            .attempts
            .list_attempts(None, Some(student_id.clone()))
            .await?;
        let exams = self.exams.list_exams().await?;
        let questions = self.bank.list_questions(None).await?;

        Ok(summarize_student(
            student_id,
            &attempts,
            &exams.iter().map(|e| (e.id, e)).collect(),
            &index(&questions),
        ))
    }

    pub async fn teacher_overview(&self, identity: &Identity) -> Result<TeacherOverview> {
        identity.require_teacher()?;
        let exams = self.exams.list_exams().await?;
        let questions = self.bank.list_questions(None).await?;
        let attempts = self.attempts.list_attempts(None, None).await?;

        let active_exams = exams
            .iter()
            .filter(|e| e.status == ExamStatus::Active)
            .count();
        let titles: HashMap<i64, &str> = exams.iter().map(|e| (e.id, e.title.as_str())).collect();

        Ok(TeacherOverview {
            total_exams: exams.len(),
            active_exams,
            inactive_exams: exams.len() - active_exams,
            total_questions: questions.len(),
            questions_by_type: QuestionType::ALL
                .iter()
                .map(|t| TypeCount {
                    question_type: *t,
                    count: questions.iter().filter(|q| q.question_type == *t).count(),
                })
                .collect(),
            total_students: attempts
                .iter()
                .map(|a| a.student_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
            recent_activity: attempts
                .iter()
                .take(RECENT_LIMIT)
                .map(|a| RecentSubmission {
                    exam_id: a.exam_id,
                    exam_title: titles.get(&a.exam_id).copied().unwrap_or_default().to_string(),
                    student_id: a.student_id.clone(),
                    score: a.total_score,
                    max_score: a.max_score,
                    submitted_at: a.submitted_at,
                })
                .collect(),
        })
    }
}

fn index(questions: &[Question]) -> HashMap<i64, &Question> {
    questions.iter().map(|q| (q.id, q)).collect()
}

pub fn summarize_exam(
    exam: &Exam,
    attempts: &[ExamAttempt],
    questions: &HashMap<i64, &Question>,
) -> ExamStatistics {
    let scores: Vec<i32> = attempts.iter().map(|a| a.total_score).collect();
    let average_score = if scores.is_empty() {
        0.0
    } else {
        round2(scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64)
    };

    let mut score_distribution: Vec<ScoreBand> = BANDS
        .iter()
        .map(|(_, range)| ScoreBand {
            grade_range: range.to_string(),
            count: 0,
        })
        .collect();
    for attempt in attempts {
        let pct = percentage(attempt.total_score, attempt.max_score);
        if let Some(idx) = BANDS.iter().position(|(floor, _)| pct >= *floor) {
            score_distribution[idx].count += 1;
        }
    }

    let mut question_accuracy: Vec<QuestionAccuracy> = exam
        .questions
        .iter()
        .filter_map(|eq| {
            let graded: Vec<_> = attempts
                .iter()
                .filter_map(|a| a.report.iter().find(|g| g.question_id == eq.question_id))
                .collect();
            let bank_entry = questions.get(&eq.question_id);
            let question_type = bank_entry
                .map(|q| q.question_type)
                .or_else(|| graded.first().map(|g| g.question_type))?;

            let correct_count = graded.iter().filter(|g| g.is_correct).count();
            let total_count = graded.len();
            Some(QuestionAccuracy {
                question_id: eq.question_id,
                question_text: bank_entry
                    .map(|q| truncate(&q.question_text, STATS_TEXT_LIMIT))
                    .unwrap_or_default(),
                question_type,
                correct_count,
                total_count,
                accuracy_rate: if total_count == 0 {
                    0.0
                } else {
                    round2(correct_count as f64 * 100.0 / total_count as f64)
                },
            })
        })
        .collect();
    question_accuracy.sort_by(|a, b| {
        a.accuracy_rate
            .total_cmp(&b.accuracy_rate)
            .then(a.question_id.cmp(&b.question_id))
    });

    ExamStatistics {
        exam_id: exam.id,
        title: exam.title.clone(),
        total_questions: exam.questions.len(),
        duration_minutes: exam.duration_minutes,
        participants: attempts
            .iter()
            .map(|a| a.student_id.as_str())
            .collect::<HashSet<_>>()
            .len(),
        submissions: attempts.len(),
        average_score,
        min_score: scores.iter().copied().min().unwrap_or(0),
        max_score: scores.iter().copied().max().unwrap_or(0),
        score_distribution,
        question_accuracy,
    }
}

/// `attempts` must be newest first.
pub fn summarize_student(
    student_id: String,
    attempts: &[ExamAttempt],
    exams: &HashMap<i64, &Exam>,
    questions: &HashMap<i64, &Question>,
) -> StudentPerformance {
    let scores: Vec<i32> = attempts.iter().map(|a| a.total_score).collect();
    let title_of = |exam_id: i64| {
        exams
            .get(&exam_id)
            .map(|e| e.title.clone())
            .unwrap_or_default()
    };

    let exam_history = attempts
        .iter()
        .map(|a| ExamHistoryEntry {
            exam_id: a.exam_id,
            exam_title: title_of(a.exam_id),
            score: a.total_score,
            max_score: a.max_score,
            duration_minutes: exams.get(&a.exam_id).map_or(0, |e| e.duration_minutes),
            total_questions: a.report.len(),
            submitted_at: a.submitted_at,
        })
        .collect();

    let wrong_questions = attempts
        .iter()
        .flat_map(|a| a.report.iter().map(move |g| (a, g)))
        .filter(|(_, g)| !g.is_correct)
        .take(WRONG_ANSWER_LIMIT)
        .map(|(a, g)| WrongAnswer {
            exam_id: a.exam_id,
            exam_title: title_of(a.exam_id),
            question_id: g.question_id,
            question_text: questions
                .get(&g.question_id)
                .map(|q| truncate(&q.question_text, WRONG_TEXT_LIMIT))
                .unwrap_or_default(),
            question_type: g.question_type,
            correct_answer: g.correct_answer.clone(),
            submitted_answer: g.submitted_answer.clone(),
        })
        .collect();

    StudentPerformance {
        student_id,
        total_exams: attempts.len(),
        average_score: if scores.is_empty() {
            0.0
        } else {
            round2(scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64)
        },
        highest_score: scores.iter().copied().max().unwrap_or(0),
        lowest_score: scores.iter().copied().min().unwrap_or(0),
        exam_history,
        wrong_questions,
    }
}

fn percentage(score: i32, max_score: i32) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    score as f64 * 100.0 / max_score as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        format!("{}...", text.chars().take(limit).collect::<String>())
    } else {
        text.to_string()
    }
}
