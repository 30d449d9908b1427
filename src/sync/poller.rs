//! Polling of deferred jobs until they reach a terminal status.

use std::time::Duration;

use url::Url;

use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, HttpRequest, HttpResponse};

use super::body::{ParsedBody, normalize_results};
use super::{SyncError, TaskSyncResponse, TaskSyncStatus};

/// Message used when a failed status query carries no usable text.
const STATUS_QUERY_FAILED: &str = "status query failed";

/// Attempt budget and pacing for [`JobPoller::poll`].
///
/// The wait before the first query is always [`FIRST_DELAY`](Self::FIRST_DELAY)
/// to give the remote a head start; every later wait is `interval`.
/// Worst-case latency is therefore `FIRST_DELAY + (attempts - 1) * interval`.
///
/// # Example
///
/// ```
/// use task_sync::sync::PollOptions;
/// use std::time::Duration;
///
/// let options = PollOptions::new()
///     .with_attempts(4)
///     .with_interval(Duration::from_secs(2));
///
/// assert_eq!(options.delay_before(0), Duration::from_secs(3));
/// assert_eq!(options.delay_before(1), Duration::from_secs(2));
/// assert_eq!(options.worst_case_latency(), Duration::from_secs(9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Maximum number of status queries.
    pub attempts: u32,

    /// Wait between consecutive status queries.
    pub interval: Duration,
}

impl PollOptions {
    /// Default number of status queries.
    pub const DEFAULT_ATTEMPTS: u32 = 12;

    /// Default wait between status queries (5 seconds).
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

    /// Fixed wait before the first status query (3 seconds).
    pub const FIRST_DELAY: Duration = Duration::from_millis(3000);

    /// Minimum value for `attempts`.
    pub const MIN_ATTEMPTS: u32 = 1;

    /// Creates options with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempts: Self::DEFAULT_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Sets the maximum number of status queries.
    ///
    /// # Panics
    ///
    /// Panics if `attempts` is less than 1.
    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        assert!(attempts >= Self::MIN_ATTEMPTS, "attempts must be at least 1");
        self.attempts = attempts;
        self
    }

    /// Sets the wait between status queries after the first one.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Raises the attempt budget to one and a half queries per submitted entry.
    ///
    /// Large batches take the remote longer; the budget never shrinks.
    #[must_use]
    pub fn scaled_for_batch(mut self, batch_size: usize) -> Self {
        let scaled = u32::try_from(batch_size.saturating_mul(3).div_ceil(2)).unwrap_or(u32::MAX);
        self.attempts = self.attempts.max(scaled);
        self
    }

    /// Returns the wait before the query with the given 0-based index.
    #[must_use]
    pub const fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Self::FIRST_DELAY
        } else {
            self.interval
        }
    }

    /// Returns the total wait if every attempt is used.
    #[must_use]
    pub fn worst_case_latency(&self) -> Duration {
        Self::FIRST_DELAY
            .saturating_add(self.interval.saturating_mul(self.attempts.saturating_sub(1)))
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Queries a job's status until it reaches a terminal state.
///
/// Polls are strictly sequential. Callers must not poll the same job id
/// from two tasks at once. There is no cancellation: a caller that stops
/// caring must simply drop the future or ignore its result.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between queries (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct JobPoller<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    status_endpoint: Option<Url>,
}

impl<H> JobPoller<H, TokioSleeper> {
    /// Creates a poller querying `{status_endpoint}/{jobId}`.
    ///
    /// A missing endpoint is reported by [`poll`](Self::poll), not here.
    #[must_use]
    pub const fn new(client: H, status_endpoint: Option<Url>) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            status_endpoint,
        }
    }
}

impl<H, S> JobPoller<H, S> {
    /// Sets a custom sleeper for the waits between queries.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> JobPoller<H, S2> {
        JobPoller {
            client: self.client,
            sleeper,
            status_endpoint: self.status_endpoint,
        }
    }

    /// Returns the configured status endpoint.
    #[must_use]
    pub const fn status_endpoint(&self) -> Option<&Url> {
        self.status_endpoint.as_ref()
    }

    /// Builds the status URL for `job_id`, percent-encoding the id as one
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if no status endpoint is configured,
    /// the endpoint cannot carry a path, or `job_id` is blank.
    pub fn status_url(&self, job_id: &str) -> Result<Url, SyncError> {
        let endpoint = self
            .status_endpoint
            .as_ref()
            .ok_or_else(|| SyncError::config("status endpoint is not configured"))?;
        if job_id.trim().is_empty() {
            return Err(SyncError::config("job id must not be empty"));
        }

        let mut url = endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SyncError::config(format!("status endpoint '{endpoint}' cannot carry a path"))
            })?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }
}

impl<H: HttpClient, S: Sleeper> JobPoller<H, S> {
    /// Polls `job_id` until a terminal status or the attempt budget runs out.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Config`] if no status endpoint is configured
    /// - [`SyncError::NotFound`] on a 404, without further attempts
    /// - [`SyncError::Remote`] on any other non-2xx, without further attempts
    /// - [`SyncError::Timeout`] if no terminal status was seen in time
    /// - [`SyncError::Http`] for transport failures
    pub async fn poll(
        &self,
        job_id: &str,
        options: PollOptions,
    ) -> Result<TaskSyncResponse, SyncError> {
        let url = self.status_url(job_id)?;

        for attempt in 0..options.attempts {
            let wait = options.delay_before(attempt);
            if !wait.is_zero() {
                self.sleeper.sleep(wait).await;
            }

            let response = self.client.request(HttpRequest::get(url.clone())).await?;

            match interpret_status(job_id, &response)? {
                Some(done) => {
                    tracing::info!(
                        job_id,
                        status = %done.status,
                        attempt = attempt + 1,
                        "job finished"
                    );
                    return Ok(done);
                }
                None => {
                    tracing::debug!(job_id, attempt = attempt + 1, "job not finished yet");
                }
            }
        }

        Err(SyncError::Timeout {
            job_id: job_id.to_string(),
            attempts: options.attempts,
        })
    }
}

/// Interprets one status query response.
///
/// Returns `Ok(None)` while the job is still in a non-terminal state
/// (including a missing or unrecognized status).
///
/// # Errors
///
/// Returns [`SyncError::NotFound`] on 404 and [`SyncError::Remote`] on any
/// other non-2xx status.
pub fn interpret_status(
    job_id: &str,
    response: &HttpResponse,
) -> Result<Option<TaskSyncResponse>, SyncError> {
    let body = ParsedBody::from_response(response);

    if response.status == http::StatusCode::NOT_FOUND {
        return Err(SyncError::NotFound {
            job_id: job_id.to_string(),
        });
    }
    if !response.is_success() {
        return Err(SyncError::Remote {
            status: response.status,
            message: body.remote_message(STATUS_QUERY_FAILED),
        });
    }

    let status = body.status().unwrap_or(TaskSyncStatus::Unknown);
    if !status.is_terminal() {
        return Ok(None);
    }

    Ok(Some(TaskSyncResponse {
        status,
        job_id: Some(job_id.to_string()),
        results: normalize_results(&body.data),
        created_at: body.timestamp("createdAt"),
        updated_at: body.timestamp("updatedAt"),
        completed_at: body.timestamp("completedAt"),
    }))
}
