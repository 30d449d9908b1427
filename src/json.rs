//! Loose predicates over untyped JSON values.
//!
//! Remote payloads and lookup tables are only loosely typed, so several
//! layers need the same notion of "has a value".

use serde_json::Value;

/// Returns true if the value counts as present in a loosely typed payload.
///
/// `null`, `false`, `0` and the empty string are absent; arrays and objects
/// are present even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns the trimmed string if `value` is a string with visible content.
#[must_use]
pub fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Returns true if a record field carries a meaningful value.
///
/// Strings must be non-blank, arrays must contain a meaningful item, and
/// objects are judged by their `text`, `name` or `id` string when one exists,
/// otherwise by having any key at all.
#[must_use]
pub fn has_meaningful_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => items.iter().any(has_meaningful_value),
        Value::Object(obj) => ["text", "name", "id"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map_or(!obj.is_empty(), |s| !s.trim().is_empty()),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
