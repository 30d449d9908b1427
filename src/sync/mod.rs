//! Batch task synchronization with a remote automation system.
//!
//! A batch travels through these pieces:
//! - [`partition_eligible`] drops entries missing required fields
//! - [`WebhookResolver`] resolves the destination webhook URL once per process
//! - [`BatchSubmitter`] posts the batch to the trigger endpoint
//! - [`JobPoller`] follows a deferred (202) submission until it finishes
//! - [`ResultAggregator`] reduces the results to a [`SyncSummary`]
//!
//! Nothing in this module retries on its own. Every failure is surfaced as a
//! [`SyncError`] whose [`kind`](SyncError::kind) tells the caller what went
//! wrong.

pub mod body;
mod eligibility;
mod error;
mod poller;
mod resolver;
mod submitter;
mod summary;
mod types;

#[cfg(test)]
mod poller_tests;
#[cfg(test)]
mod resolver_tests;
#[cfg(test)]
mod summary_tests;
#[cfg(test)]
mod test_fixtures;

pub use eligibility::{Eligibility, SkippedEntry, partition_eligible};
pub use error::{ErrorKind, ResolveError, SyncError};
pub use poller::{JobPoller, PollOptions, interpret_status};
pub use resolver::WebhookResolver;
pub use submitter::{BatchSubmitter, classify_submission};
pub use summary::{Outcome, ResultAggregator, StatusCounts, SyncSummary, effective_results};
pub use types::{TaskSyncEntry, TaskSyncResponse, TaskSyncResultEntry, TaskSyncStatus};
