//! Reduce loosely typed comparator input to a [`Normalized`] shape.
//!
//! Rules, first match wins:
//!
//! 1. an object with a non-empty `components` field -> that field (plus the
//!    sibling `identifier`, when it is a string)
//! 2. an object with an `audioHash` key -> the object itself
//! 3. an object with a string `idOnly` key -> identifier-only
//! 4. text starting with `{` or `[` -> parsed as JSON and normalized again;
//!    malformed JSON degrades to the empty record
//! 5. any other text -> identifier-only
//! 6. anything else (numbers, arrays, booleans, null, other objects) -> the
//!    empty record
//!
//! Normalization never fails. Applying it to its own output returns the same
//! shape.

use serde_json::Value;
use tracing::debug;

use crate::types::{CompareInput, Normalized};

/// Normalize one side of a comparison.
///
/// ```rust
/// use matcher::{normalize, Normalized};
///
/// assert_eq!(normalize("d41d8cd9"), Normalized::IdOnly("d41d8cd9".into()));
/// assert_eq!(normalize("{oops"), Normalized::empty_record());
/// ```
pub fn normalize(input: impl Into<CompareInput>) -> Normalized {
    match input.into() {
        CompareInput::Fingerprint(fp) => Normalized::Record {
            components: fp.components.to_value(),
            identifier: Some(fp.identifier),
        },
        CompareInput::Components(record) => Normalized::Record {
            components: record.to_value(),
            identifier: None,
        },
        CompareInput::Text(text) => normalize_text(text),
        CompareInput::Json(value) => normalize_value(value),
        CompareInput::Normalized(normalized) => normalized,
    }
}

fn normalize_text(text: String) -> Normalized {
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return Normalized::IdOnly(text);
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => normalize_value(value),
        Err(err) => {
            debug!(error = %err, "normalize_malformed_json");
            Normalized::empty_record()
        }
    }
}

fn normalize_value(value: Value) -> Normalized {
    match value {
        Value::Object(mut map) => {
            if map.get("components").is_some_and(is_non_empty) {
                let identifier = match map.remove("identifier") {
                    Some(Value::String(id)) => Some(id),
                    _ => None,
                };
                let components = map.remove("components").unwrap_or(Value::Null);
                return Normalized::Record {
                    components,
                    identifier,
                };
            }
            if map.contains_key("audioHash") {
                return Normalized::Record {
                    components: Value::Object(map),
                    identifier: None,
                };
            }
            if let Some(Value::String(id)) = map.remove("idOnly") {
                return Normalized::IdOnly(id);
            }
            debug!(keys = map.len(), "normalize_unrecognized_object");
            Normalized::empty_record()
        }
        Value::String(text) => normalize_text(text),
        other => {
            debug!(kind = value_kind(&other), "normalize_unrecognized_value");
            Normalized::empty_record()
        }
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
