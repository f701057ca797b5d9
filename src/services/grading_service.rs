use crate::models::answer::{AnswerRole, CanonicalAnswer};
use crate::models::attempt::{GradeReport, GradedQuestion, Submission};
use crate::models::snapshot::ExamSnapshot;
use crate::services::answer_canonicalizer::canonicalize;

pub struct GradingService;

impl GradingService {
    /// Grades a submission against the snapshot the student actually saw.
    ///
    /// Pure: the same `(snapshot, submission)` pair always yields the same
    /// report. Missing answers grade as incorrect. Multiple-choice questions
    /// are all-or-nothing. Totals saturate at `i32::MAX`.
    pub fn grade(snapshot: &ExamSnapshot, submission: &Submission) -> GradeReport {
        let mut total_score: i32 = 0;
        let mut max_score: i32 = 0;
        let mut correct_count: usize = 0;
        let mut graded: Vec<GradedQuestion> = Vec::with_capacity(snapshot.questions.len());

        for q in &snapshot.questions {
            max_score = max_score.saturating_add(q.score);

            let correct = canonicalize(
                q.question_type,
                Some(&serde_json::to_value(&q.correct_answer).unwrap_or_default()),
                AnswerRole::StoredCorrect,
            );
            let submitted = canonicalize(
                q.question_type,
                submission.answer_for(q.question_id),
                AnswerRole::Submitted,
            );
            let is_correct = is_match(&correct, &submitted);

            let points_earned = if is_correct { q.score } else { 0 };
            if is_correct {
                correct_count += 1;
                total_score = total_score.saturating_add(points_earned);
            }

            graded.push(GradedQuestion {
                question_id: q.question_id,
                question_type: q.question_type,
                correct_answer: correct,
                submitted_answer: submitted,
                is_correct,
                points_earned,
                max_points: q.score,
            });
        }

        GradeReport {
            total_score,
            max_score,
            correct_count,
            questions: graded,
        }
    }
}

/// Exact equality of canonical values; for multiple choice that is set equality.
fn is_match(correct: &CanonicalAnswer, submitted: &CanonicalAnswer) -> bool {
    match (correct, submitted) {
        // An empty correct answer never matches, even an empty submission.
        (CanonicalAnswer::Single(c), CanonicalAnswer::Single(s)) => !c.is_empty() && c == s,
        (CanonicalAnswer::Multiple(c), CanonicalAnswer::Multiple(s)) => !c.is_empty() && c == s,
        (CanonicalAnswer::Boolean(c), CanonicalAnswer::Boolean(s)) => c == s,
        _ => false,
    }
}
