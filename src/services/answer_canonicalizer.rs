//! Canonical forms for stored and submitted answers.
//!
//! `single` -> one uppercase label, `multiple` -> a set of uppercase labels,
//! `boolean` -> one bool. Malformed input is never an error; it maps to a
//! defined best-effort value.

use crate::models::answer::{AnswerRole, CanonicalAnswer};
use crate::models::question::QuestionType;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

const TRUE_WORDS: [&str; 5] = ["true", "t", "1", "是", "对"];
const MULTI_DELIMITERS: [char; 2] = [',', '，'];

pub fn canonicalize(
    question_type: QuestionType,
    raw: Option<&JsonValue>,
    role: AnswerRole,
) -> CanonicalAnswer {
    let raw = match raw {
        Some(value) => decode_json_list(value),
        None => return CanonicalAnswer::empty(question_type),
    };

    match question_type {
        QuestionType::Boolean => CanonicalAnswer::Boolean(boolean_of(&raw, role)),
        QuestionType::Single => CanonicalAnswer::Single(single_of(&raw, role)),
        QuestionType::Multiple => CanonicalAnswer::Multiple(multiple_of(&raw)),
    }
}

/// Stored answers sometimes arrive as a JSON-encoded list, e.g. `"[\"A\",\"C\"]"`.
fn decode_json_list(value: &JsonValue) -> JsonValue {
    if let JsonValue::String(s) = value {
        let trimmed = s.trim();
        if trimmed.starts_with('[') {
            if let Ok(parsed @ JsonValue::Array(_)) = serde_json::from_str::<JsonValue>(trimmed) {
                return parsed;
            }
        }
    }
    value.clone()
}

fn boolean_of(raw: &JsonValue, role: AnswerRole) -> bool {
    match raw {
        JsonValue::Bool(b) => *b,
        JsonValue::Array(items) if items.len() == 1 => boolean_of(&items[0], role),
        JsonValue::String(s) => is_true_word(s),
        JsonValue::Number(n) => is_true_word(&n.to_string()),
        JsonValue::Null => false,
        other => {
            note_ambiguous(role, QuestionType::Boolean, other);
            false
        }
    }
}

fn is_true_word(s: &str) -> bool {
    let lowered = s.trim().to_lowercase();
    TRUE_WORDS.contains(&lowered.as_str())
}

fn single_of(raw: &JsonValue, role: AnswerRole) -> String {
    match raw {
        JsonValue::Array(items) => {
            if items.len() > 1 {
                note_ambiguous(role, QuestionType::Single, raw);
            }
            items.first().map(label_of).unwrap_or_default()
        }
        other => label_of(other),
    }
}

fn multiple_of(raw: &JsonValue) -> BTreeSet<String> {
    let labels: Vec<String> = match raw {
        JsonValue::Array(items) => items.iter().map(label_of).collect(),
        JsonValue::String(s) => s.split(MULTI_DELIMITERS).map(str::to_string).collect(),
        JsonValue::Null => Vec::new(),
        other => vec![label_of(other)],
    };

    labels
        .into_iter()
        .map(|l| l.trim().to_uppercase())
        .filter(|l| !l.is_empty())
        .collect()
}

fn label_of(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.trim().to_uppercase(),
        JsonValue::Null => String::new(),
        other => other.to_string().trim().to_uppercase(),
    }
}

fn note_ambiguous(role: AnswerRole, question_type: QuestionType, raw: &JsonValue) {
    match role {
        AnswerRole::StoredCorrect => tracing::warn!(
            question_type = %question_type,
            raw = %raw,
            "Stored correct answer has an ambiguous shape; using best-effort canonical form"
        ),
        AnswerRole::Submitted => tracing::debug!(
            question_type = %question_type,
            raw = %raw,
            "Submitted answer has an ambiguous shape; using best-effort canonical form"
        ),
    }
}
