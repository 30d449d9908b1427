//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid URL provided.
    #[error("Invalid URL for {field} '{url}': {reason}")]
    InvalidUrl {
        /// Name of the field
        field: &'static str,
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid non-duration value.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid duration value (zero or too large).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}

/// Well-known field names used in error messages.
pub mod field {
    /// The trigger endpoint field.
    pub const TRIGGER: &str = "endpoints.trigger";
    /// The status endpoint field.
    pub const STATUS: &str = "endpoints.status";
    /// The static webhook URL field.
    pub const WEBHOOK_URL: &str = "webhook.url";
    /// The poll attempts field.
    pub const POLL_ATTEMPTS: &str = "poll.attempts";
    /// The poll interval field.
    pub const POLL_INTERVAL: &str = "poll.interval_ms";
    /// The HTTP timeout field.
    pub const HTTP_TIMEOUT: &str = "http.timeout_secs";
    /// The required fields list.
    pub const REQUIRED_FIELDS: &str = "batch.required_fields";
}

impl ConfigError {
    /// Creates an `InvalidDuration` error for a zero value.
    #[must_use]
    pub fn zero_duration(field: &'static str) -> Self {
        Self::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        }
    }
}
