//! Configuration layer for task-sync.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Blank strings count as "not set" for endpoints and the webhook source.
//!
//! # Endpoints
//!
//! Neither endpoint is required at load time. When only the trigger endpoint
//! is given, the status endpoint is derived from it by appending `/status`.
//! A command that needs a missing endpoint fails when it gets there, before
//! any request is sent.
//!
//! # Webhook Source
//!
//! A static `webhook.url` wins over a `webhook.table` lookup. With neither,
//! submissions fail with a configuration error.
//!
//! # Required Fields
//!
//! CLI `--required-field` values **replace** `batch.required_fields` entirely
//! (not merged).

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command};
pub use error::ConfigError;
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, derive_status_endpoint, write_default_config};
