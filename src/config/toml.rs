//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Remote endpoints
    #[serde(default)]
    pub endpoints: EndpointsSection,

    /// Webhook URL source
    #[serde(default)]
    pub webhook: WebhookSection,

    /// Job polling configuration
    #[serde(default)]
    pub poll: PollSection,

    /// Batch preparation configuration
    #[serde(default)]
    pub batch: BatchSection,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpSection,
}

/// Endpoint configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointsSection {
    /// Endpoint that accepts batch submissions
    pub trigger: Option<String>,

    /// Endpoint for job status queries
    pub status: Option<String>,
}

/// Webhook URL source section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Fixed webhook URL
    pub url: Option<String>,

    /// Lookup table export holding the webhook URL
    pub table: Option<PathBuf>,

    /// Column of the lookup table to read
    pub column: Option<String>,
}

/// Job polling section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    /// Maximum number of status queries
    pub attempts: Option<u32>,

    /// Wait between status queries in milliseconds
    pub interval_ms: Option<u64>,
}

/// Batch preparation section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    /// Payload fields every record must carry
    #[serde(default)]
    pub required_fields: Vec<String>,
}

/// HTTP client section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# task-sync configuration file

[endpoints]
# Endpoint that accepts batch submissions
# trigger = "https://automation.example.com/api/task-sync"

# Endpoint for job status queries
# Default: the trigger endpoint followed by "/status"
# status = "https://automation.example.com/api/task-sync/status"

[webhook]
# Where the webhook URL forwarded with every batch comes from.
# A fixed url wins over a lookup table.
# url = "https://hooks.example.com/flow/abc"

# JSON export of a lookup table; the first non-empty cell of the
# primary field (or of `column`) is used
# table = "webhook-table.json"
# column = "URL"

[poll]
# Maximum number of status queries (default: 12)
# Large batches raise this to 1.5 queries per record
attempts = 12

# Wait between status queries in milliseconds (default: 5000)
# The first query always waits 3000 ms
interval_ms = 5000

[batch]
# Payload fields every record must carry; records missing one are skipped
# required_fields = ["task", "deadline"]

[http]
# Request timeout in seconds (default: 30)
timeout_secs = 30
"#
    .to_string()
}
