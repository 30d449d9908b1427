//! Error types for HTTP operations.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Covers failures where no HTTP response was obtained at all. A response
/// with a non-success status is not an `HttpError`; callers inspect
/// [`HttpResponse::status`](super::HttpResponse::status) themselves.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
