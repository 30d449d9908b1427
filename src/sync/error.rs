//! Error taxonomy for batch submission and job polling.

use std::sync::Arc;

use thiserror::Error;

use crate::lookup::LookupError;
use crate::transport::HttpError;

/// Coarse classification of a [`SyncError`].
///
/// None of these are retried by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required endpoint or webhook URL missing or blank.
    Config,
    /// The remote violated the expected response contract.
    Protocol,
    /// Non-2xx HTTP status from either endpoint.
    Remote,
    /// The polled job does not exist or has expired.
    NotFound,
    /// Poll attempts exhausted; the job may still finish later.
    Timeout,
    /// No HTTP response was obtained at all.
    Transport,
}

/// Failure of a webhook URL resolution.
///
/// Cloneable so that every caller coalesced onto one resolution receives
/// the same failure.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The lookup produced a value that is blank after trimming.
    #[error("webhook URL is empty")]
    Empty,

    /// The lookup itself failed.
    #[error(transparent)]
    Lookup(Arc<LookupError>),
}

impl From<LookupError> for ResolveError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(Arc::new(e))
    }
}

/// Error type for submission and polling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or unusable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The webhook URL could not be resolved.
    #[error("Configuration error: cannot resolve webhook URL: {0}")]
    Resolve(#[from] ResolveError),

    /// The caller tried to submit zero entries.
    #[error("Refusing to submit an empty batch")]
    EmptyBatch,

    /// The remote answered with a shape that breaks the protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Non-2xx response.
    #[error("HTTP {}: {message}", .status.as_u16())]
    Remote {
        /// Response status
        status: http::StatusCode,
        /// Best-effort message extracted from the body
        message: String,
    },

    /// Status endpoint answered 404 for the job.
    #[error("Job '{job_id}' does not exist or has expired")]
    NotFound {
        /// The polled job
        job_id: String,
    },

    /// No terminal status within the attempt budget.
    #[error("Job '{job_id}' did not complete in time after {attempts} status checks; check again later")]
    Timeout {
        /// The polled job
        job_id: String,
        /// Number of status queries made
        attempts: u32,
    },

    /// Transport failure before any response arrived.
    #[error("Request failed: {0}")]
    Http(#[from] HttpError),

    /// The submission body could not be encoded.
    #[error("Failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    /// Creates a `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Resolve(_) | Self::EmptyBatch | Self::Encode(_) => {
                ErrorKind::Config
            }
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Http(_) => ErrorKind::Transport,
        }
    }
}
