//! Turns any stored option representation into an ordered `(label, text)` list.
//!
//! Accepted shapes: a list of texts, a keyed map of label to text, an already
//! normalized list of `{label, text}` objects, or a JSON-encoded string of any
//! of these. Dirty data never fails: the result always holds at least one option.

use crate::models::option::OptionItem;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Label for the option at zero-based `index`: `A`..`Z`, then `"27"`, `"28"`, ...
pub fn label_for_index(index: usize) -> String {
    match LETTERS.get(index) {
        Some(letter) => (*letter as char).to_string(),
        None => (index + 1).to_string(),
    }
}

pub fn normalize_options(raw: Option<&JsonValue>) -> Vec<OptionItem> {
    let items = match raw {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::String(s)) => from_text(s),
        Some(value) => from_value(value),
    };

    if items.is_empty() {
        tracing::debug!("Option data empty or missing; substituting a placeholder option");
        return vec![OptionItem::new(label_for_index(0), "")];
    }
    items
}

/// Whether the raw data holds at least one real option.
///
/// Used to reject choice questions before assembly; `normalize_options` itself
/// always pads to one option.
pub fn has_options(raw: Option<&JsonValue>) -> bool {
    match raw {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::String(s)) => !from_text(s).is_empty(),
        Some(value) => !from_value(value).is_empty(),
    }
}

fn from_text(s: &str) -> Vec<OptionItem> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(JsonValue::String(inner)) => vec![OptionItem::new(label_for_index(0), inner)],
        Ok(parsed) => from_value(&parsed),
        Err(_) => vec![OptionItem::new(label_for_index(0), s)],
    }
}

fn from_value(value: &JsonValue) -> Vec<OptionItem> {
    match value {
        JsonValue::Array(items) => {
            if let Some(pairs) = already_normalized(items) {
                return pairs;
            }
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| OptionItem::new(label_for_index(idx), item_text(item)))
                .collect()
        }
        JsonValue::Object(map) => map
            .iter()
            .map(|(label, text)| OptionItem::new(label.clone(), text_of(text)))
            .collect(),
        JsonValue::Null => Vec::new(),
        scalar => vec![OptionItem::new(label_for_index(0), text_of(scalar))],
    }
}

/// Recognizes the serialized form of a normalized option list so that
/// normalization is idempotent. Duplicate labels disqualify the list.
fn already_normalized(items: &[JsonValue]) -> Option<Vec<OptionItem>> {
    if items.is_empty() {
        return None;
    }
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let obj = item.as_object()?;
        if obj.len() != 2 {
            return None;
        }
        let label = obj.get("label")?.as_str()?;
        let text = obj.get("text")?.as_str()?;
        if !seen.insert(label) {
            return None;
        }
        out.push(OptionItem::new(label, text));
    }
    Some(out)
}

/// Text of a list entry; a `{label, text}` object contributes only its text.
fn item_text(item: &JsonValue) -> String {
    match item.get("text") {
        Some(text) if item.is_object() => text_of(text),
        _ => text_of(item),
    }
}

fn text_of(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
