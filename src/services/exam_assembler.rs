//! Turns selection criteria into an ordered exam question list, and an exam
//! into a per-attempt snapshot.

use crate::error::{Error, Result};
use crate::models::answer::{AnswerRole, CanonicalAnswer};
use crate::models::exam::{Exam, ExamQuestion};
use crate::models::option::OptionItem;
use crate::models::question::{Category, Question, QuestionType};
use crate::models::snapshot::{DisplayedOption, ExamSnapshot, SnapshotQuestion};
use crate::services::answer_canonicalizer::canonicalize;
use crate::services::option_normalizer::{has_options, label_for_index, normalize_options};
use crate::services::quota_resolver::{self, PoolEntry, QuotaShortfall, RandomConfig};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Prefix marking a correct-answer label that names no option of its question.
/// No displayed option ever carries it, so such a label can never be matched.
pub const UNMATCHED_LABEL_PREFIX: &str = "?";

/// Upper bound for any per-question score an exam may assign.
pub const MAX_QUESTION_SCORE: i32 = 1000;

#[derive(Debug, Clone)]
pub enum AssemblyCriteria {
    /// Explicit ids in the order they should appear.
    Manual {
        question_ids: Vec<i64>,
        score_overrides: HashMap<i64, i32>,
    },
    Random(RandomConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub questions: Vec<ExamQuestion>,
    pub shortfalls: Vec<QuotaShortfall>,
}

pub fn assemble<R: Rng + ?Sized>(
    criteria: &AssemblyCriteria,
    pool: &[Question],
    categories: &[Category],
    default_score: i32,
    rng: &mut R,
) -> Result<Assembly> {
    validate_score(default_score, "default score")?;
    match criteria {
        AssemblyCriteria::Manual {
            question_ids,
            score_overrides,
        } => assemble_manual(question_ids, score_overrides, pool, default_score),
        AssemblyCriteria::Random(config) => {
            assemble_random(config, pool, categories, default_score, rng)
        }
    }
}

/// Manual assembly: looks every id up in the pool, keeping the caller's order.
///
/// Also used for the edit flow, where the previous list is discarded and this
/// runs again with an empty override map.
pub fn assemble_manual(
    question_ids: &[i64],
    score_overrides: &HashMap<i64, i32>,
    pool: &[Question],
    default_score: i32,
) -> Result<Assembly> {
    validate_score(default_score, "default score")?;
    for (id, score) in score_overrides {
        validate_score(*score, &format!("score override for question {}", id))?;
    }

    let by_id: HashMap<i64, &Question> = pool.iter().map(|q| (q.id, q)).collect();
    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(question_ids.len());

    for id in question_ids {
        let question = by_id.get(id).ok_or(Error::UnknownQuestion(*id))?;
        if !seen.insert(*id) {
            return Err(Error::InvalidConfiguration(format!(
                "Question {} is listed more than once",
                id
            )));
        }
        validate_question(question)?;
        questions.push(ExamQuestion {
            question_id: *id,
            score: score_overrides.get(id).copied().unwrap_or(default_score),
        });
    }

    Ok(Assembly {
        questions,
        shortfalls: Vec::new(),
    })
}

fn assemble_random<R: Rng + ?Sized>(
    config: &RandomConfig,
    pool: &[Question],
    categories: &[Category],
    default_score: i32,
    rng: &mut R,
) -> Result<Assembly> {
    let names: HashMap<i64, &str> = categories.iter().map(|c| (c.id, c.name.as_str())).collect();

    let mut sorted: Vec<&Question> = pool.iter().collect();
    sorted.sort_by_key(|q| q.id);

    let mut pools: BTreeMap<QuestionType, Vec<PoolEntry>> = BTreeMap::new();
    for question in sorted {
        if let Err(e) = validate_question(question) {
            tracing::warn!(question_id = question.id, error = %e, "Skipping invalid question in random pool");
            continue;
        }
        pools
            .entry(question.question_type)
            .or_default()
            .push(PoolEntry {
                id: question.id,
                category: question
                    .category_id
                    .and_then(|cid| names.get(&cid))
                    .map(|name| name.to_string()),
            });
    }

    let resolution = quota_resolver::resolve(config, &pools, rng)?;

    let questions = QuestionType::ALL
        .iter()
        .flat_map(|t| resolution.ids_for(*t).iter())
        .map(|id| ExamQuestion {
            question_id: *id,
            score: default_score,
        })
        .collect();

    Ok(Assembly {
        questions,
        shortfalls: resolution.shortfalls,
    })
}

fn validate_score(score: i32, what: &str) -> Result<()> {
    if score <= 0 || score > MAX_QUESTION_SCORE {
        return Err(Error::InvalidConfiguration(format!(
            "The {} must be between 1 and {}, got {}",
            what, MAX_QUESTION_SCORE, score
        )));
    }
    Ok(())
}

/// Rejects questions that cannot be rendered: empty text, or a choice
/// question without any option.
pub fn validate_question(question: &Question) -> Result<()> {
    if question.question_text.trim().is_empty() {
        return Err(Error::InvalidConfiguration(format!(
            "Question {} has empty text",
            question.id
        )));
    }
    if question.question_type.has_options() && !has_options(question.options.as_ref()) {
        return Err(Error::InvalidConfiguration(format!(
            "Question {} is a {} question without options",
            question.id, question.question_type
        )));
    }
    Ok(())
}

/// Freezes one student's view of an exam.
///
/// When the exam is randomized, question order and each question's option
/// order are shuffled independently, and options are relabelled by position.
/// Correct answers are captured in the displayed labels.
pub fn build_snapshot<R: Rng + ?Sized>(
    exam: &Exam,
    pool: &[Question],
    student_id: &str,
    attempt_id: Uuid,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ExamSnapshot> {
    let by_id: HashMap<i64, &Question> = pool.iter().map(|q| (q.id, q)).collect();

    let mut included: Vec<(&Question, i32)> = exam
        .questions
        .iter()
        .map(|eq| {
            by_id
                .get(&eq.question_id)
                .map(|q| (*q, eq.score))
                .ok_or(Error::UnknownQuestion(eq.question_id))
        })
        .collect::<Result<_>>()?;

    if exam.is_randomized {
        included.shuffle(rng);
    }

    let questions = included
        .into_iter()
        .map(|(question, score)| snapshot_question(question, score, exam.is_randomized, rng))
        .collect();

    Ok(ExamSnapshot {
        attempt_id,
        exam_id: exam.id,
        title: exam.title.clone(),
        duration_minutes: exam.duration_minutes,
        switch_limit: exam.switch_limit,
        student_id: student_id.to_string(),
        created_at: now,
        questions,
    })
}

fn snapshot_question<R: Rng + ?Sized>(
    question: &Question,
    score: i32,
    shuffle: bool,
    rng: &mut R,
) -> SnapshotQuestion {
    let stored = canonicalize(
        question.question_type,
        Some(&question.correct_answer),
        AnswerRole::StoredCorrect,
    );

    if !question.question_type.has_options() {
        return SnapshotQuestion {
            question_id: question.id,
            question_type: question.question_type,
            question_text: question.question_text.clone(),
            score,
            options: Vec::new(),
            correct_answer: stored,
        };
    }

    let mut items = normalize_options(question.options.as_ref());
    if shuffle {
        items.shuffle(rng);
    }
    let options = display_options(items, shuffle);

    let relabel: HashMap<String, String> = options
        .iter()
        .map(|o| (o.source_label.trim().to_uppercase(), o.label.clone()))
        .collect();
    let correct_answer = translate(question.id, stored, &relabel);

    SnapshotQuestion {
        question_id: question.id,
        question_type: question.question_type,
        question_text: question.question_text.clone(),
        score,
        options,
        correct_answer,
    }
}

/// Displayed labels are the uppercased source labels, unless the options were
/// shuffled or uppercasing would collide, in which case they are positional.
fn display_options(items: Vec<OptionItem>, shuffled: bool) -> Vec<DisplayedOption> {
    let upper: Vec<String> = items.iter().map(|o| o.label.trim().to_uppercase()).collect();
    let unique = upper.iter().collect::<HashSet<_>>().len() == upper.len()
        && upper.iter().all(|l| !l.is_empty());
    let positional = shuffled || !unique;

    items
        .into_iter()
        .zip(upper)
        .enumerate()
        .map(|(idx, (item, up))| DisplayedOption {
            label: if positional { label_for_index(idx) } else { up },
            text: item.text,
            source_label: item.label,
        })
        .collect()
}

fn translate(
    question_id: i64,
    answer: CanonicalAnswer,
    relabel: &HashMap<String, String>,
) -> CanonicalAnswer {
    let map_label = |label: String| -> String {
        if label.is_empty() {
            return label;
        }
        match relabel.get(&label) {
            Some(display) => display.clone(),
            None => {
                tracing::warn!(
                    question_id,
                    label = %label,
                    "Correct answer names an option the question does not have"
                );
                format!("{}{}", UNMATCHED_LABEL_PREFIX, label)
            }
        }
    };

    match answer {
        CanonicalAnswer::Single(label) => CanonicalAnswer::Single(map_label(label)),
        CanonicalAnswer::Multiple(labels) => {
            CanonicalAnswer::Multiple(labels.into_iter().map(map_label).collect())
        }
        boolean => boolean,
    }
}
