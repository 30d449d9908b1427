//! Response body parsing and result normalization.
//!
//! Remote automation systems answer in loosely specified JSON. Everything
//! here is pure and never fails: a body that cannot be understood degrades
//! to an empty or raw representation instead of masking the HTTP outcome.

use serde_json::{Map, Value, json};

use crate::json::{is_truthy, non_blank};
use crate::transport::HttpResponse;

use super::{TaskSyncResultEntry, TaskSyncStatus};

/// Message used when no failure text can be found.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Keys that may wrap a result list, in the order they are checked.
const LIST_KEYS: [&str; 3] = ["results", "data", "result"];

/// Keys whose presence marks an object as a single result entry.
const ENTRY_KEYS: [&str; 4] = ["recordId", "status", "message", "detail"];

/// A response body decoded as far as possible.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody {
    /// The body as text.
    pub raw: String,
    /// The decoded JSON, `{}` for an empty body, or `{ "raw": text }` when
    /// the text is not JSON.
    pub data: Value,
}

impl ParsedBody {
    /// Decodes the body of `response`.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self::parse(response.body_text_lossy())
    }

    /// Decodes `raw` text.
    #[must_use]
    pub fn parse(raw: String) -> Self {
        if raw.is_empty() {
            return Self {
                raw,
                data: Value::Object(Map::new()),
            };
        }

        let data = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "response body is not valid JSON, keeping raw text");
                json!({ "raw": raw.as_str() })
            }
        };

        Self { raw, data }
    }

    /// Returns a top-level field if the body is a JSON object.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.as_object().and_then(|obj| obj.get(key))
    }

    /// Returns the `status` field, if present and a non-blank string.
    #[must_use]
    pub fn status(&self) -> Option<TaskSyncStatus> {
        self.field("status")
            .and_then(non_blank)
            .map(TaskSyncStatus::from_wire)
    }

    /// Returns the `jobId` field as text; numeric ids are stringified.
    #[must_use]
    pub fn job_id(&self) -> Option<String> {
        match self.field("jobId")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns an integral timestamp field such as `createdAt`.
    #[must_use]
    pub fn timestamp(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(Value::as_i64)
    }

    /// Builds the message for a non-2xx response.
    ///
    /// Uses `message`, `detail`, `error`, then the raw body, then `fallback`.
    #[must_use]
    pub fn remote_message(&self, fallback: &str) -> String {
        first_non_blank([
            self.field("message").and_then(non_blank),
            self.field("detail").and_then(non_blank),
            self.field("error").and_then(non_blank),
            Some(self.raw.trim()),
        ])
        .unwrap_or(fallback)
        .to_string()
    }
}

/// Returns the first candidate with visible content.
fn first_non_blank<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Derives the human-readable failure text of a result entry.
///
/// Order: `message`, `detail`, the body (text as-is, other JSON
/// stringified), then [`UNKNOWN_ERROR`].
#[must_use]
pub fn extract_message(entry: &TaskSyncResultEntry) -> String {
    first_non_blank([entry.message.as_deref(), entry.detail.as_deref()])
        .map(str::to_string)
        .or_else(|| entry.body.as_ref().and_then(stringify_body))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

fn stringify_body(body: &Value) -> Option<String> {
    match body {
        Value::Null => None,
        Value::String(s) => first_non_blank([Some(s.as_str())]).map(str::to_string),
        other => Some(other.to_string()),
    }
}

/// The accepted layouts of a result list, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape<'a> {
    /// The body itself is the list.
    Bare(&'a [Value]),
    /// The list sits under one of `results`, `data` or `result`.
    Keyed {
        /// The wrapping key
        key: &'static str,
        /// The list items
        items: &'a [Value],
    },
    /// The body is one result entry.
    Single(&'a Value),
    /// Nothing recognizable.
    Unrecognized,
}

impl<'a> ResultShape<'a> {
    /// Classifies a decoded body.
    #[must_use]
    pub fn classify(body: &'a Value) -> Self {
        if let Some(items) = bare_list(body) {
            return Self::Bare(items);
        }
        if let Some((key, items)) = LIST_KEYS
            .iter()
            .find_map(|key| keyed_list(body, key).map(|items| (*key, items)))
        {
            return Self::Keyed { key, items };
        }
        if let Some(entry) = single_entry(body) {
            return Self::Single(entry);
        }
        Self::Unrecognized
    }

    /// Flattens the shape into result entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<TaskSyncResultEntry> {
        match self {
            Self::Bare(items) | Self::Keyed { items, .. } => {
                items.iter().map(TaskSyncResultEntry::from_json).collect()
            }
            Self::Single(entry) => vec![TaskSyncResultEntry::from_json(entry)],
            Self::Unrecognized => Vec::new(),
        }
    }
}

/// Matches a body that is itself an array.
#[must_use]
pub fn bare_list(body: &Value) -> Option<&[Value]> {
    body.as_array().map(Vec::as_slice)
}

/// Matches an object holding an array under `key`.
#[must_use]
pub fn keyed_list<'a>(body: &'a Value, key: &str) -> Option<&'a [Value]> {
    body.as_object()?.get(key)?.as_array().map(Vec::as_slice)
}

/// Matches an object that looks like one result entry.
#[must_use]
pub fn single_entry(body: &Value) -> Option<&Value> {
    let obj = body.as_object()?;
    ENTRY_KEYS
        .iter()
        .any(|key| obj.get(*key).is_some_and(is_truthy))
        .then_some(body)
}

/// Normalizes any accepted body layout into a flat result list.
#[must_use]
pub fn normalize_results(body: &Value) -> Vec<TaskSyncResultEntry> {
    ResultShape::classify(body).into_entries()
}
