use exam_engine::dto::attempt_dto::{StudentExamView, SubmitExamRequest};
use exam_engine::dto::exam_dto::{CreateExamPayload, ReplaceQuestionsPayload};
use exam_engine::error::Error;
use exam_engine::models::identity::Identity;
use exam_engine::models::question::{Category, Question};
use exam_engine::store::{AttemptStore, InMemoryStore};
use exam_engine::utils::rng::shared_rng;
use exam_engine::AppState;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

async fn seeded_state() -> AppState {
    let store = InMemoryStore::new();
    store
        .insert_category(Category { id: 1, name: "algebra".into() })
        .await;
    store
        .insert_category(Category { id: 2, name: "geometry".into() })
        .await;

    for id in 1..=6 {
        let category = if id <= 3 { 1 } else { 2 };
        store
            .insert_question(question(json!({
                "id": id,
                "question_text": format!("Single {}", id),
                "question_type": "single",
                "category_id": category,
                "options": ["one", "two", "three", "four"],
                "correct_answer": "C"
            })))
            .await;
    }
    for id in 11..=13 {
        store
            .insert_question(question(json!({
                "id": id,
                "question_text": format!("Multiple {}", id),
                "question_type": "multiple",
                "options": { "A": "a", "B": "b", "C": "c" },
                "correct_answer": "A,B"
            })))
            .await;
    }
    store
        .insert_question(question(json!({
            "id": 21,
            "question_text": "Boolean 21",
            "question_type": "boolean",
            "correct_answer": 1
        })))
        .await;

    AppState::with_rng(Arc::new(store), shared_rng(Some(42)), 5)
}

fn question(value: JsonValue) -> Question {
    serde_json::from_value(value).unwrap()
}

fn create_payload(value: JsonValue) -> CreateExamPayload {
    serde_json::from_value(value).unwrap()
}

async fn correct_answers(state: &AppState, attempt_id: Uuid) -> JsonValue {
    let snapshot = state.store.get_snapshot(attempt_id).await.unwrap();
    let mut answers = Map::new();
    for q in &snapshot.questions {
        answers.insert(
            q.question_id.to_string(),
            serde_json::to_value(&q.correct_answer).unwrap(),
        );
    }
    JsonValue::Object(answers)
}

fn submit_request(attempt_id: Uuid, answers: JsonValue, switch_count: i32) -> SubmitExamRequest {
    serde_json::from_value(json!({
        "attempt_id": attempt_id,
        "answers": answers,
        "switch_count": switch_count
    }))
    .unwrap()
}

#[tokio::test]
async fn full_exam_lifecycle() {
    let state = seeded_state().await;
    let teacher = Identity::teacher("t1");
    let student = Identity::student("s1");

    let created = assert_ok!(
        state
            .exam_service
            .create_exam(
                create_payload(json!({
                    "title": "Unit test",
                    "duration_minutes": 20,
                    "switch_limit": 2,
                    "is_randomized": true,
                    "question_ids": [2, 11, 21],
                    "score_overrides": { "11": 10 }
                })),
                &teacher,
            )
            .await
    );
    let exam_id = created.exam.id;
    assert_eq!(created.exam.max_score(), 20);

    // New exams are closed to students.
    assert!(matches!(
        state.attempt_service.start_attempt(exam_id, &student).await,
        Err(Error::BadRequest(_))
    ));
    assert_ok!(state.exam_service.toggle_status(exam_id, &teacher).await);

    let view = assert_ok!(state.attempt_service.start_attempt(exam_id, &student).await);
    assert_eq!(view.questions.len(), 3);
    assert_eq!(view.max_score, 20);

    let resumed = assert_ok!(state.attempt_service.start_attempt(exam_id, &student).await);
    assert_eq!(resumed.attempt_id, view.attempt_id);
    let order = |v: &StudentExamView| -> Vec<i64> {
        v.questions.iter().map(|q| q.question_id).collect()
    };
    assert_eq!(order(&resumed), order(&view));

    let answers = correct_answers(&state, view.attempt_id).await;
    let result = assert_ok!(
        state
            .attempt_service
            .submit(submit_request(view.attempt_id, answers.clone(), 5), &student)
            .await
    );
    assert_eq!(result.total_score, 20);
    assert_eq!(result.correct_count, 3);
    assert!(result.switch_limit_exceeded, "5 switches over a limit of 2");

    let again = state
        .attempt_service
        .submit(submit_request(view.attempt_id, answers, 0), &student)
        .await;
    assert!(matches!(again, Err(Error::Conflict(_))));

    let restart = state.attempt_service.start_attempt(exam_id, &student).await;
    assert!(matches!(restart, Err(Error::Conflict(_))));

    let stats = assert_ok!(state.analytics_service.exam_statistics(exam_id, &teacher).await);
    assert_eq!(stats.submissions, 1);
    assert_eq!(stats.score_distribution[0].count, 1);

    let perf = assert_ok!(
        state
            .analytics_service
            .student_performance(None, &student)
            .await
    );
    assert_eq!(perf.total_exams, 1);
    assert!(perf.wrong_questions.is_empty());
}

#[tokio::test]
async fn random_exam_reports_shortfalls_and_tops_up() {
    let state = seeded_state().await;
    let teacher = Identity::teacher("t1");

    let created = assert_ok!(
        state
            .exam_service
            .create_exam(
                create_payload(json!({
                    "title": "Random",
                    "duration_minutes": 15,
                    "random_config": {
                        "single": { "total": 5, "byCategory": { "geometry": 2, "history": 1 } },
                        "multiple": { "total": 5 },
                        "true_false": { "total": 1 }
                    }
                })),
                &teacher,
            )
            .await
    );

    let ids: Vec<i64> = created.exam.questions.iter().map(|q| q.question_id).collect();
    assert_eq!(ids.len(), 9, "5 single, 3 multiple, 1 boolean");
    assert!(ids[..5].iter().all(|id| (1..=6).contains(id)));
    assert!(ids[..5].iter().filter(|id| **id >= 4).count() >= 2);
    assert!(ids[5..8].iter().all(|id| (11..=13).contains(id)));
    assert_eq!(ids[8], 21);

    let mut shortfalls: Vec<(Option<String>, usize)> = created
        .shortfalls
        .iter()
        .map(|s| (s.category.clone(), s.deficit()))
        .collect();
    shortfalls.sort();
    assert_eq!(shortfalls, vec![(None, 2), (Some("history".into()), 1)]);
}

#[tokio::test]
async fn replace_questions_rebuilds_the_list() {
    let state = seeded_state().await;
    let teacher = Identity::teacher("t1");
    let created = assert_ok!(
        state
            .exam_service
            .create_exam(
                create_payload(json!({
                    "title": "Edit me", "duration_minutes": 10, "question_ids": [1, 2]
                })),
                &teacher,
            )
            .await
    );

    let payload: ReplaceQuestionsPayload = serde_json::from_value(json!({
        "exam_id": created.exam.id,
        "question_ids": [21, 3],
        "default_score": 7
    }))
    .unwrap();
    let exam = assert_ok!(state.exam_service.replace_questions(payload, &teacher).await);
    let ids: Vec<i64> = exam.questions.iter().map(|q| q.question_id).collect();
    assert_eq!(ids, vec![21, 3]);
    assert_eq!(exam.max_score(), 14);

    let payload: ReplaceQuestionsPayload = serde_json::from_value(json!({
        "exam_id": created.exam.id,
        "question_ids": [99]
    }))
    .unwrap();
    let err = assert_err!(state.exam_service.replace_questions(payload, &teacher).await);
    assert!(matches!(err, Error::UnknownQuestion(99)));
}

#[tokio::test]
async fn students_cannot_submit_for_someone_else() {
    let state = seeded_state().await;
    let teacher = Identity::teacher("t1");
    let created = assert_ok!(
        state
            .exam_service
            .create_exam(
                create_payload(json!({
                    "title": "Mine", "duration_minutes": 10, "question_ids": [21]
                })),
                &teacher,
            )
            .await
    );
    assert_ok!(state.exam_service.toggle_status(created.exam.id, &teacher).await);

    let view = assert_ok!(
        state
            .attempt_service
            .start_attempt(created.exam.id, &Identity::student("owner"))
            .await
    );
    let other = state
        .attempt_service
        .submit(
            submit_request(view.attempt_id, json!({ "21": true }), 0),
            &Identity::student("intruder"),
        )
        .await;
    assert!(matches!(other, Err(Error::Unauthorized(_))));
}
