use chrono::Utc;
use exam_engine::models::attempt::{answers_from_value, Submission};
use exam_engine::models::exam::{Exam, ExamQuestion, ExamStatus};
use exam_engine::models::question::Question;
use exam_engine::services::exam_assembler::{assemble, build_snapshot, AssemblyCriteria};
use exam_engine::services::grading_service::GradingService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use uuid::Uuid;

/// Bank rows in the shapes they are stored in: list options, keyed options,
/// a JSON-encoded answer string and the legacy boolean type name.
fn bank() -> Vec<Question> {
    serde_json::from_value(json!([
        {
            "id": 1,
            "question_text": "Which planet is known as the red planet?",
            "question_type": "single",
            "options": ["Venus", "Mars", "Jupiter"],
            "correct_answer": "B"
        },
        {
            "id": 2,
            "question_text": "Which of these are primes?",
            "question_type": "multiple",
            "options": "{\"A\": \"2\", \"B\": \"4\", \"C\": \"5\", \"D\": \"9\"}",
            "correct_answer": "[\"A\", \"C\"]"
        },
        {
            "id": 3,
            "question_text": "Water boils at 100C at sea level.",
            "question_type": "true_false",
            "correct_answer": "对"
        }
    ]))
    .unwrap()
}

fn exam(is_randomized: bool) -> Exam {
    let mut rng = StdRng::seed_from_u64(0);
    let criteria = AssemblyCriteria::Manual {
        question_ids: vec![1, 2, 3],
        score_overrides: HashMap::new(),
    };
    let assembly = assemble(&criteria, &bank(), &[], 5, &mut rng).unwrap();
    let now = Utc::now();
    Exam {
        id: 1,
        title: "Science".into(),
        duration_minutes: 30,
        switch_limit: 0,
        is_randomized,
        status: ExamStatus::Active,
        questions: assembly.questions,
        created_by: "teacher".into(),
        created_at: now,
        updated_at: now,
    }
}

fn submission(answers: JsonValue) -> Submission {
    Submission {
        exam_id: 1,
        student_id: "student".into(),
        answers: answers_from_value(answers),
        switch_count: 0,
        submit_time: Utc::now(),
    }
}

#[test]
fn assembled_exam_scores_each_question_at_default() {
    let exam = exam(false);
    assert_eq!(
        exam.questions,
        vec![
            ExamQuestion { question_id: 1, score: 5 },
            ExamQuestion { question_id: 2, score: 5 },
            ExamQuestion { question_id: 3, score: 5 },
        ]
    );
}

#[test]
fn correct_submission_scores_fifteen() {
    let mut rng = StdRng::seed_from_u64(1);
    let snapshot =
        build_snapshot(&exam(false), &bank(), "student", Uuid::new_v4(), Utc::now(), &mut rng)
            .unwrap();

    let report = GradingService::grade(
        &snapshot,
        &submission(json!({ "1": ["B"], "2": ["A", "C"], "3": true })),
    );

    assert_eq!(report.total_score, 15);
    assert_eq!(report.max_score, 15);
    assert!(report.questions.iter().all(|q| q.is_correct));
}

#[test]
fn wrong_submission_scores_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    let snapshot =
        build_snapshot(&exam(false), &bank(), "student", Uuid::new_v4(), Utc::now(), &mut rng)
            .unwrap();

    let report = GradingService::grade(
        &snapshot,
        &submission(json!({ "1": ["A"], "2": ["A"], "3": false })),
    );

    assert_eq!(report.total_score, 0);
    assert!(report.questions.iter().all(|q| !q.is_correct));
}

#[test]
fn shuffled_attempt_grades_by_displayed_labels() {
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let snapshot =
            build_snapshot(&exam(true), &bank(), "student", Uuid::new_v4(), Utc::now(), &mut rng)
                .unwrap();

        // Pick options by their text, the way a student reading the screen would.
        let label_of = |question_id: i64, text: &str| -> String {
            snapshot
                .question(question_id)
                .unwrap()
                .options
                .iter()
                .find(|o| o.text == text)
                .unwrap()
                .label
                .clone()
        };
        let answers = json!([
            { "question_id": 1, "answer": label_of(1, "Mars") },
            { "question_id": "2", "answer": format!("{},{}", label_of(2, "5"), label_of(2, "2")) },
            { "question_id": 3, "answer": "T" }
        ]);

        let report = GradingService::grade(&snapshot, &submission(answers));
        assert_eq!(report.total_score, 15, "seed {}", seed);
    }
}
