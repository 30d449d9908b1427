//! Application execution logic.
//!
//! This module drives one command: it loads the records, drops the ones
//! missing required fields, submits the batch, follows a deferred job and
//! reduces the outcome to a summary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use task_sync::config::{Command, ValidatedConfig};
use task_sync::lookup::{ConfiguredLookup, WebhookLookup};
use task_sync::sync::{
    BatchSubmitter, Eligibility, ErrorKind, JobPoller, Outcome, PollOptions, ResultAggregator,
    SyncError, SyncSummary, TaskSyncEntry, WebhookResolver, partition_eligible,
};
use task_sync::time::{Sleeper, TokioSleeper};
use task_sync::transport::{HttpClient, HttpError, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to read the records file.
    #[error("Failed to read records file '{}': {source}", path.display())]
    RecordsRead {
        /// Path to the records file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The records file is not a JSON array of entries.
    #[error("Failed to parse records file '{}': {source}", path.display())]
    RecordsParse {
        /// Path to the records file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Every record was skipped by the required-field check.
    #[error("Nothing to submit: all {skipped} record(s) lack required fields")]
    NothingToSubmit {
        /// Number of skipped records
        skipped: usize,
    },

    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] HttpError),

    /// Submission or polling failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl RunError {
    /// Returns true if the failure stems from configuration or input
    /// rather than from the remote side.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        match self {
            Self::RecordsRead { .. } | Self::RecordsParse { .. } | Self::NothingToSubmit { .. } => {
                true
            }
            Self::Client(_) => false,
            Self::Sync(e) => matches!(e.kind(), ErrorKind::Config),
        }
    }
}

/// The work requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Submit the records in a file.
    Submit {
        /// Records file
        records: PathBuf,
        /// Log instead of sending
        dry_run: bool,
    },
    /// Follow an existing job.
    Status {
        /// Job to follow
        job_id: String,
        /// Number of records originally submitted
        expected: Option<usize>,
    },
}

impl Task {
    /// Extracts the task from a command; `init` has none.
    #[must_use]
    pub fn from_command(command: &Command) -> Option<Self> {
        match command {
            Command::Init { .. } => None,
            Command::Submit { records, dry_run } => Some(Self::Submit {
                records: records.clone(),
                dry_run: *dry_run,
            }),
            Command::Status { job_id, expected } => Some(Self::Status {
                job_id: job_id.clone(),
                expected: *expected,
            }),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The batch (or job) outcome.
    Summary(SyncSummary),
    /// A dry run; nothing was sent.
    DryRun {
        /// Records that would have been submitted
        eligible: usize,
        /// Records skipped for missing fields
        skipped: usize,
    },
}

impl Report {
    /// Returns true if any record failed remotely.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        matches!(self, Self::Summary(summary) if summary.outcome == Outcome::Failed)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary(summary) => write!(f, "{summary}"),
            Self::DryRun { eligible, skipped } => write!(
                f,
                "Dry run: {eligible} task(s) would be submitted, {skipped} skipped"
            ),
        }
    }
}

/// Submitter, poller and aggregator wired to one client and resolver.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation, shared by submitter and poller
/// - `L`: The webhook URL lookup
/// - `S`: The sleeper used between status queries (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct Session<H, L, S = TokioSleeper> {
    submitter: BatchSubmitter<H, L>,
    poller: JobPoller<H, S>,
    aggregator: ResultAggregator,
    poll: PollOptions,
}

impl<H: Clone, L> Session<H, L> {
    /// Creates a session from validated configuration.
    #[must_use]
    pub fn new(client: H, lookup: L, config: &ValidatedConfig) -> Self {
        let resolver = Arc::new(WebhookResolver::new(lookup));
        Self {
            submitter: BatchSubmitter::new(
                client.clone(),
                resolver,
                config.trigger_endpoint.clone(),
            ),
            poller: JobPoller::new(client, config.status_endpoint.clone()),
            aggregator: ResultAggregator::new(),
            poll: config.poll,
        }
    }
}

#[cfg(test)]
impl<H, L, S> Session<H, L, S> {
    /// Sets a custom sleeper for the waits between status queries.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Session<H, L, S2> {
        Session {
            submitter: self.submitter,
            poller: self.poller.with_sleeper(sleeper),
            aggregator: self.aggregator,
            poll: self.poll,
        }
    }
}

impl<H: HttpClient, L: WebhookLookup, S: Sleeper> Session<H, L, S> {
    /// Submits an already filtered batch and waits for its outcome.
    ///
    /// A deferred submission is polled with an attempt budget scaled to
    /// the batch size.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Sync`] if submission or polling fails.
    pub async fn sync_batch(&self, batch: &Eligibility) -> Result<SyncSummary, RunError> {
        let entries = &batch.eligible;
        tracing::info!(
            records = entries.len(),
            skipped = batch.skipped_count(),
            "submitting batch"
        );

        let submitted = self.submitter.submit(entries).await?;

        let response = match submitted.deferred_job() {
            Some(job_id) => {
                let options = self.poll.scaled_for_batch(entries.len());
                tracing::info!(
                    job_id,
                    attempts = options.attempts,
                    "waiting for deferred job"
                );
                self.poller.poll(job_id, options).await?
            }
            None => submitted,
        };

        Ok(self
            .aggregator
            .summarize_response(&response, entries, batch.skipped_count()))
    }

    /// Follows an existing job until it finishes.
    ///
    /// `expected` is the number of records originally submitted; without
    /// it the number of returned results is used. If the job itemizes
    /// nothing either, the summary only carries the job status.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Sync`] if polling fails.
    pub async fn follow_job(
        &self,
        job_id: &str,
        expected: Option<usize>,
    ) -> Result<SyncSummary, RunError> {
        let options = self.poll.scaled_for_batch(expected.unwrap_or_default());
        let response = self.poller.poll(job_id, options).await?;
        let total = match expected {
            Some(total) => total,
            None if response.results.is_empty() => {
                return Ok(self.aggregator.summarize_uncounted(&response));
            }
            None => response.results.len(),
        };

        Ok(self.aggregator.summarize_job(&response, total, 0))
    }
}

/// Executes one task with the production HTTP client.
///
/// # Errors
///
/// Returns an error if the records cannot be loaded, nothing is left to
/// submit, or submission or polling fails.
pub async fn execute(config: ValidatedConfig, task: Task) -> Result<Report, RunError> {
    match task {
        Task::Submit { records, dry_run } => {
            let entries = load_records(&records).await?;
            let batch = prepare_batch(entries, &config.required_fields)?;

            if dry_run {
                return Ok(dry_run_report(&batch));
            }

            let session = create_session(&config)?;
            session.sync_batch(&batch).await.map(Report::Summary)
        }
        Task::Status { job_id, expected } => {
            let session = create_session(&config)?;
            session
                .follow_job(&job_id, expected)
                .await
                .map(Report::Summary)
        }
    }
}

type AppSession = Session<ReqwestClient, ConfiguredLookup>;

fn create_session(config: &ValidatedConfig) -> Result<AppSession, RunError> {
    let client = ReqwestClient::with_timeout(config.request_timeout).map_err(RunError::Client)?;
    Ok(Session::new(client, config.webhook.clone(), config))
}

/// Reads a JSON array of `{ recordId, payload }` entries.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_records(path: &Path) -> Result<Vec<TaskSyncEntry>, RunError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunError::RecordsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    serde_json::from_str(&content).map_err(|e| RunError::RecordsParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Drops entries lacking required fields.
///
/// # Errors
///
/// Returns [`SyncError::EmptyBatch`] for an empty records file and
/// [`RunError::NothingToSubmit`] if every entry was dropped.
pub fn prepare_batch(
    entries: Vec<TaskSyncEntry>,
    required: &[String],
) -> Result<Eligibility, RunError> {
    if entries.is_empty() {
        return Err(SyncError::EmptyBatch.into());
    }
    let batch = partition_eligible(entries, required);

    for skipped in &batch.skipped {
        tracing::warn!(
            "Skipping record {}: missing {}",
            skipped.record_id,
            skipped.missing.join(", ")
        );
    }

    if batch.is_empty() {
        return Err(RunError::NothingToSubmit {
            skipped: batch.skipped_count(),
        });
    }

    Ok(batch)
}

fn dry_run_report(batch: &Eligibility) -> Report {
    for entry in &batch.eligible {
        tracing::info!(
            "Dry-run: would submit {} ({} field(s))",
            entry.record_id,
            entry.payload.len()
        );
    }

    Report::DryRun {
        eligible: batch.eligible.len(),
        skipped: batch.skipped_count(),
    }
}
