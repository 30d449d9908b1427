//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::lookup::{ConfiguredLookup, StaticLookup, TableFileLookup};
use crate::sync::PollOptions;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// Missing endpoints are not a validation failure here: the submitter and
/// poller report them when they are actually needed, so that commands which
/// only use one endpoint work with partial configuration.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Endpoint that accepts batch submissions
    pub trigger_endpoint: Option<Url>,

    /// Endpoint for job status queries
    pub status_endpoint: Option<Url>,

    /// Source of the webhook URL
    pub webhook: ConfiguredLookup,

    /// Attempt budget and pacing for job polling
    pub poll: PollOptions,

    /// Payload fields every record must carry
    pub required_fields: Vec<String>,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = |url: Option<&Url>| url.map_or_else(|| "none".to_string(), Url::to_string);
        let webhook = match &self.webhook {
            ConfiguredLookup::Static(_) => "static".to_string(),
            ConfiguredLookup::Table(table) => format!("table:{}", table.path().display()),
            ConfiguredLookup::Unconfigured => "none".to_string(),
        };

        write!(
            f,
            "Config {{ trigger: {}, status: {}, webhook: {}, poll: {}x/{}ms, timeout: {}s, \
             required_fields: {} }}",
            endpoint(self.trigger_endpoint.as_ref()),
            endpoint(self.status_endpoint.as_ref()),
            webhook,
            self.poll.attempts,
            self.poll.interval.as_millis(),
            self.request_timeout.as_secs(),
            self.required_fields.len(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An endpoint or the static webhook URL is not a valid URL
    /// - The poll attempts, poll interval or timeout is zero
    /// - A required field name is blank
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let (trigger_endpoint, status_endpoint) = Self::resolve_endpoints(cli, toml)?;
        let webhook = Self::resolve_webhook(cli, toml)?;
        let poll = Self::resolve_poll(cli, toml)?;
        let required_fields = Self::resolve_required_fields(cli, toml)?;
        let request_timeout = Self::resolve_timeout(cli, toml)?;

        Ok(Self {
            trigger_endpoint,
            status_endpoint,
            webhook,
            poll,
            required_fields,
            request_timeout,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_endpoints(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<(Option<Url>, Option<Url>), ConfigError> {
        let endpoints = toml.map(|t| &t.endpoints);

        let trigger_str = non_blank(
            cli.trigger_endpoint
                .as_deref()
                .or_else(|| endpoints.and_then(|e| e.trigger.as_deref())),
        );
        let trigger = trigger_str
            .map(|s| parse_url(field::TRIGGER, s))
            .transpose()?;

        let status_str = non_blank(
            cli.status_endpoint
                .as_deref()
                .or_else(|| endpoints.and_then(|e| e.status.as_deref())),
        );
        let status = match status_str {
            Some(s) => Some(parse_url(field::STATUS, s)?),
            None => trigger_str
                .map(|s| parse_url(field::STATUS, &derive_status_endpoint(s)))
                .transpose()?,
        };

        Ok((trigger, status))
    }

    fn resolve_webhook(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<ConfiguredLookup, ConfigError> {
        let webhook = toml.map(|t| &t.webhook);

        // Priority: CLI explicit > TOML, static URL before table
        let url = non_blank(
            cli.webhook_url
                .as_deref()
                .or_else(|| webhook.and_then(|w| w.url.as_deref())),
        );
        if let Some(url) = url {
            parse_url(field::WEBHOOK_URL, url)?;
            return Ok(ConfiguredLookup::Static(StaticLookup::new(url)));
        }

        let table = cli
            .webhook_table
            .as_deref()
            .or_else(|| webhook.and_then(|w| w.table.as_deref()));
        let Some(table) = table else {
            return Ok(ConfiguredLookup::Unconfigured);
        };

        let column = non_blank(
            cli.webhook_column
                .as_deref()
                .or_else(|| webhook.and_then(|w| w.column.as_deref())),
        );
        let lookup = TableFileLookup::new(table);
        Ok(ConfiguredLookup::Table(match column {
            Some(column) => lookup.with_column(column),
            None => lookup,
        }))
    }

    fn resolve_poll(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PollOptions, ConfigError> {
        let poll = toml.map(|t| &t.poll);

        // Priority: CLI explicit > TOML > default
        let attempts = cli
            .poll_attempts
            .or_else(|| poll.and_then(|p| p.attempts))
            .unwrap_or(defaults::POLL_ATTEMPTS);

        let interval_ms = cli
            .poll_interval_ms
            .or_else(|| poll.and_then(|p| p.interval_ms))
            .unwrap_or(defaults::POLL_INTERVAL_MS);

        if attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: field::POLL_ATTEMPTS,
                reason: "must be greater than 0".to_string(),
            });
        }
        if interval_ms == 0 {
            return Err(ConfigError::zero_duration(field::POLL_INTERVAL));
        }

        Ok(PollOptions::new()
            .with_attempts(attempts)
            .with_interval(Duration::from_millis(interval_ms)))
    }

    fn resolve_required_fields(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Vec<String>, ConfigError> {
        // CLI fields replace TOML fields entirely
        let fields = if cli.required_fields.is_empty() {
            toml.map(|t| t.batch.required_fields.clone())
                .unwrap_or_default()
        } else {
            cli.required_fields.clone()
        };

        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: field::REQUIRED_FIELDS,
                reason: "field names must not be blank".to_string(),
            });
        }

        Ok(fields)
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.http.timeout_secs))
            .unwrap_or(defaults::HTTP_TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::zero_duration(field::HTTP_TIMEOUT));
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Derives the status endpoint from the trigger endpoint.
#[must_use]
pub fn derive_status_endpoint(trigger: &str) -> String {
    format!(
        "{}/{}",
        trigger.trim().trim_end_matches('/'),
        defaults::STATUS_SEGMENT
    )
}

// Helper functions

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: value.to_string(),
        reason: e.to_string(),
    })
}
