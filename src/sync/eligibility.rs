//! Pre-submission filtering of entries that lack required fields.

use crate::json::has_meaningful_value;

use super::TaskSyncEntry;

/// An entry left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub record_id: String,
    /// Required fields that were missing or blank, in configured order.
    pub missing: Vec<String>,
}

/// Entries split into the submittable batch and the skipped rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Eligibility {
    pub eligible: Vec<TaskSyncEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl Eligibility {
    /// Number of skipped entries, as fed to the aggregator.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Returns true if nothing is left to submit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}

/// Splits `entries` by whether their payload has a meaningful value for
/// every field in `required`.
///
/// Order is preserved on both sides. With no required fields every entry
/// is eligible.
#[must_use]
pub fn partition_eligible(entries: Vec<TaskSyncEntry>, required: &[String]) -> Eligibility {
    let mut result = Eligibility::default();

    for entry in entries {
        let missing: Vec<String> = required
            .iter()
            .filter(|field| !entry.payload.get(*field).is_some_and(has_meaningful_value))
            .cloned()
            .collect();

        if missing.is_empty() {
            result.eligible.push(entry);
        } else {
            tracing::debug!(record_id = %entry.record_id, ?missing, "skipping entry");
            result.skipped.push(SkippedEntry {
                record_id: entry.record_id,
                missing,
            });
        }
    }

    result
}
