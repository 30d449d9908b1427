//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

use crate::sync::PollOptions;

/// Default maximum number of job status queries.
pub const POLL_ATTEMPTS: u32 = PollOptions::DEFAULT_ATTEMPTS;

/// Default wait between job status queries in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 5000;

/// Default HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Path segment appended to the trigger endpoint to derive the status endpoint.
pub const STATUS_SEGMENT: &str = "status";

/// Default wait between job status queries as Duration.
#[must_use]
pub const fn poll_interval() -> Duration {
    Duration::from_millis(POLL_INTERVAL_MS)
}

/// Default HTTP request timeout as Duration.
#[must_use]
pub const fn http_timeout() -> Duration {
    Duration::from_secs(HTTP_TIMEOUT_SECS)
}
