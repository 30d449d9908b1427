//! Reduction of per-record outcomes into one user-facing summary.

use std::borrow::Cow;
use std::fmt;

use super::body::extract_message;
use super::{TaskSyncEntry, TaskSyncResponse, TaskSyncResultEntry, TaskSyncStatus};

/// Placeholder for failures that do not name their record.
const UNKNOWN_RECORD: &str = "unknown record";

/// Overall classification of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every submitted record succeeded.
    Succeeded,
    /// Nothing failed, but some records are still running or unconfirmed.
    InProgress,
    /// At least one record failed.
    Failed,
}

/// Per-bucket record counts.
///
/// `pending` is derived, never counted: it is whatever the submitted total
/// leaves after the other buckets, floored at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub success: usize,
    pub accepted: usize,
    pub failed: usize,
    pub pending: usize,
}

impl StatusCounts {
    /// Buckets `results` against `total_submitted` entries.
    #[must_use]
    pub fn tally(results: &[TaskSyncResultEntry], total_submitted: usize) -> Self {
        let count = |status| results.iter().filter(|r| r.has_status(status)).count();

        let success = count(TaskSyncStatus::Success);
        let accepted = count(TaskSyncStatus::Accepted);
        let failed = count(TaskSyncStatus::Error);
        let pending = total_submitted.saturating_sub(success + accepted + failed);

        Self {
            success,
            accepted,
            failed,
            pending,
        }
    }

    /// Sum of all buckets.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.success + self.accepted + self.failed + self.pending
    }
}

/// Result of [`ResultAggregator::summarize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub outcome: Outcome,
    pub total_submitted: usize,
    pub skipped: usize,
    pub counts: StatusCounts,
    /// `recordId:message` digest of the first failures, if any failed.
    pub failure_digest: Option<String>,
    /// Human-readable one-line summary.
    pub message: String,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Reduces result lists into a [`SyncSummary`].
///
/// # Example
///
/// ```
/// use task_sync::sync::{Outcome, ResultAggregator, TaskSyncResultEntry};
///
/// let results: Vec<_> = ["r1", "r2"].into_iter().map(TaskSyncResultEntry::succeeded).collect();
/// let summary = ResultAggregator::new().summarize(&results, 2, 1);
///
/// assert_eq!(summary.outcome, Outcome::Succeeded);
/// assert_eq!(summary.message, "Sync succeeded for 2 tasks, skipped 1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultAggregator {
    digest_limit: usize,
}

impl ResultAggregator {
    /// Default number of failures spelled out in the digest.
    pub const DEFAULT_DIGEST_LIMIT: usize = 3;

    /// Creates an aggregator with the default digest limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            digest_limit: Self::DEFAULT_DIGEST_LIMIT,
        }
    }

    /// Sets how many failures the digest spells out before truncating.
    #[must_use]
    pub const fn with_digest_limit(mut self, limit: usize) -> Self {
        self.digest_limit = limit;
        self
    }

    /// Summarizes a final response for the batch of `entries` that produced it.
    ///
    /// Applies [`effective_results`] before [`summarize`](Self::summarize).
    #[must_use]
    pub fn summarize_response(
        &self,
        response: &TaskSyncResponse,
        entries: &[TaskSyncEntry],
        skipped: usize,
    ) -> SyncSummary {
        let results = effective_results(response, entries);
        self.summarize(&results, entries.len(), skipped)
    }

    /// Summarizes a final response when only the batch size is known.
    ///
    /// Like [`summarize_response`](Self::summarize_response), but results
    /// synthesized for an unitemized success carry no record id.
    #[must_use]
    pub fn summarize_job(
        &self,
        response: &TaskSyncResponse,
        total_submitted: usize,
        skipped: usize,
    ) -> SyncSummary {
        let results = resolve_results(response, || {
            let success = TaskSyncResultEntry {
                status: Some(TaskSyncStatus::Success.as_str().to_string()),
                ..TaskSyncResultEntry::default()
            };
            vec![success; total_submitted]
        });
        self.summarize(&results, total_submitted, skipped)
    }

    /// Summarizes a final response that itemizes nothing, for a batch of
    /// unknown size.
    ///
    /// Only the job status is known, so no counts are reported.
    #[must_use]
    pub fn summarize_uncounted(&self, response: &TaskSyncResponse) -> SyncSummary {
        let outcome = match response.status {
            TaskSyncStatus::Success => Outcome::Succeeded,
            TaskSyncStatus::Error => Outcome::Failed,
            _ => Outcome::InProgress,
        };

        SyncSummary {
            outcome,
            total_submitted: 0,
            skipped: 0,
            counts: StatusCounts::default(),
            failure_digest: None,
            message: format!(
                "Job finished with status {} but reported no records; task count unknown",
                response.status.as_str()
            ),
        }
    }

    /// Summarizes `results` for a batch of `total_submitted` entries.
    ///
    /// No failures and nothing accepted is a success, even when some
    /// submitted records went unreported. The exception is an empty list
    /// for a non-empty batch: nothing was itemized, so every record is
    /// still pending.
    #[must_use]
    pub fn summarize(
        &self,
        results: &[TaskSyncResultEntry],
        total_submitted: usize,
        skipped: usize,
    ) -> SyncSummary {
        let counts = StatusCounts::tally(results, total_submitted);
        let unreported = results.is_empty() && total_submitted > 0;

        let outcome = if counts.failed > 0 {
            Outcome::Failed
        } else if counts.accepted == 0 && !unreported {
            Outcome::Succeeded
        } else {
            Outcome::InProgress
        };

        let failure_digest = (outcome == Outcome::Failed).then(|| {
            let failures: Vec<_> = results
                .iter()
                .filter(|r| r.has_status(TaskSyncStatus::Error))
                .collect();
            self.failure_digest(&failures)
        });

        let message = render_message(
            outcome,
            &counts,
            total_submitted,
            skipped,
            failure_digest.as_deref(),
        );

        SyncSummary {
            outcome,
            total_submitted,
            skipped,
            counts,
            failure_digest,
            message,
        }
    }

    /// Formats failures as `recordId:message` pairs.
    ///
    /// At most the digest limit are spelled out; the rest are reported as a
    /// count after an ellipsis.
    #[must_use]
    pub fn failure_digest(&self, failures: &[&TaskSyncResultEntry]) -> String {
        let mut digest = failures
            .iter()
            .take(self.digest_limit)
            .map(|entry| {
                let id = entry.record_id.as_deref().unwrap_or(UNKNOWN_RECORD);
                format!("{id}:{}", extract_message(entry))
            })
            .collect::<Vec<_>>()
            .join("; ");

        let hidden = failures.len().saturating_sub(self.digest_limit);
        if hidden > 0 {
            digest.push_str(&format!("; … (+{hidden} more)"));
        }
        digest
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the result list a final response stands for.
///
/// - An empty list with overall status `success` means every submitted
///   entry succeeded without being itemized.
/// - Entries without their own status take the overall status when it is
///   `success`, `accepted` or `error`.
///
/// Anything else is returned unchanged.
#[must_use]
pub fn effective_results<'a>(
    response: &'a TaskSyncResponse,
    entries: &[TaskSyncEntry],
) -> Cow<'a, [TaskSyncResultEntry]> {
    resolve_results(response, || {
        entries
            .iter()
            .map(|e| TaskSyncResultEntry::succeeded(e.record_id.clone()))
            .collect()
    })
}

fn resolve_results<'a>(
    response: &'a TaskSyncResponse,
    synthesize: impl FnOnce() -> Vec<TaskSyncResultEntry>,
) -> Cow<'a, [TaskSyncResultEntry]> {
    if response.results.is_empty() {
        if response.status == TaskSyncStatus::Success {
            return Cow::Owned(synthesize());
        }
        return Cow::Borrowed(&response.results);
    }

    let inherited = matches!(
        response.status,
        TaskSyncStatus::Success | TaskSyncStatus::Accepted | TaskSyncStatus::Error
    );
    if !inherited || response.results.iter().all(|r| r.status.is_some()) {
        return Cow::Borrowed(&response.results);
    }

    Cow::Owned(
        response
            .results
            .iter()
            .map(|r| {
                let mut entry = r.clone();
                entry
                    .status
                    .get_or_insert_with(|| response.status.as_str().to_string());
                entry
            })
            .collect(),
    )
}

fn render_message(
    outcome: Outcome,
    counts: &StatusCounts,
    total_submitted: usize,
    skipped: usize,
    digest: Option<&str>,
) -> String {
    let mut message = String::new();
    let mut part = |condition: bool, text: String| {
        if condition {
            message.push_str(&text);
        }
    };

    match outcome {
        Outcome::Succeeded => {
            part(true, format!("Sync succeeded for {} tasks", counts.success));
            part(skipped > 0, format!(", skipped {skipped}"));
        }
        Outcome::InProgress => {
            part(true, format!("Submitted {total_submitted} tasks"));
            part(
                counts.accepted > 0,
                format!(", {} still executing upstream", counts.accepted),
            );
            part(
                counts.pending > 0,
                format!(", {} awaiting confirmation", counts.pending),
            );
            part(skipped > 0, format!(", skipped {skipped}"));
            part(true, "; check the automation run log later for results".to_string());
        }
        Outcome::Failed => {
            part(
                true,
                format!(
                    "Sync finished: {} succeeded, {} failed",
                    counts.success, counts.failed
                ),
            );
            part(
                counts.accepted > 0,
                format!(", {} awaiting confirmation", counts.accepted),
            );
            part(skipped > 0, format!(", {skipped} skipped"));
            part(true, format!(". Failures: {}", digest.unwrap_or_default()));
        }
    }

    message
}
