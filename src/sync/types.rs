//! Data model shared by the submitter, poller and aggregator.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record to submit.
///
/// `payload` is an opaque bag of fields the remote automation needs
/// (task name, deadline, assignees, ...). Entries are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSyncEntry {
    /// Stable identifier of the source record.
    pub record_id: String,
    /// Fields forwarded to the remote automation.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl TaskSyncEntry {
    /// Creates an entry for `record_id` carrying `payload`.
    #[must_use]
    pub fn new(record_id: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            record_id: record_id.into(),
            payload,
        }
    }
}

/// Outcome reported for one record.
///
/// Every field is optional; remote systems itemize as much or as little as
/// they like.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSyncResultEntry {
    pub record_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub detail: Option<String>,
    pub http: Option<u16>,
    pub body: Option<Value>,
}

impl TaskSyncResultEntry {
    /// Builds an entry from an untyped JSON item.
    ///
    /// Fields of an unexpected type are treated as absent rather than
    /// failing the whole result list. Numeric record ids are stringified.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            record_id: obj.get("recordId").and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            status: text("status"),
            message: text("message"),
            detail: text("detail"),
            http: obj
                .get("http")
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
            body: obj.get("body").filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Creates a successful entry for `record_id`.
    #[must_use]
    pub fn succeeded(record_id: impl Into<String>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            status: Some(TaskSyncStatus::Success.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Returns true if the entry's status parses to `status`.
    #[must_use]
    pub fn has_status(&self, status: TaskSyncStatus) -> bool {
        self.status.as_deref().map(TaskSyncStatus::from_wire) == Some(status)
    }
}

/// Status of a batch submission or job.
///
/// `success`, `accepted`, `partial` and `error` are terminal; everything
/// else means "keep polling".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSyncStatus {
    Pending,
    Running,
    Success,
    Accepted,
    Partial,
    Error,
    #[serde(other)]
    Unknown,
}

impl TaskSyncStatus {
    /// Statuses after which polling stops.
    pub const TERMINAL: [Self; 4] = [Self::Success, Self::Accepted, Self::Partial, Self::Error];

    /// Parses a wire status; unrecognized values map to [`Self::Unknown`].
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "accepted" => Self::Accepted,
            "partial" => Self::Partial,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Accepted => "accepted",
            Self::Partial => "partial",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true if polling must stop at this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Accepted | Self::Partial | Self::Error
        )
    }
}

impl fmt::Display for TaskSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response to a submission or a completed poll.
///
/// A deferred submission carries a `job_id` and an empty `results` list,
/// meaning "not yet known".
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSyncResponse {
    pub status: TaskSyncStatus,
    pub job_id: Option<String>,
    pub results: Vec<TaskSyncResultEntry>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl TaskSyncResponse {
    /// Returns the job id if processing was deferred to a remote job.
    #[must_use]
    pub fn deferred_job(&self) -> Option<&str> {
        self.job_id.as_deref()
    }
}
