//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// task-sync: batch task synchronization client
///
/// Submits batches of task records to a remote automation endpoint,
/// follows deferred jobs until they finish, and summarizes the outcome.
#[derive(Debug, Parser)]
#[command(name = "task-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint that accepts batch submissions
    #[arg(long = "trigger-endpoint", global = true)]
    pub trigger_endpoint: Option<String>,

    /// Endpoint for job status queries (default: <trigger-endpoint>/status)
    #[arg(long = "status-endpoint", global = true)]
    pub status_endpoint: Option<String>,

    /// Webhook URL forwarded with every batch
    #[arg(long = "webhook-url", global = true)]
    pub webhook_url: Option<String>,

    /// Lookup table export holding the webhook URL
    #[arg(long = "webhook-table", value_name = "PATH", global = true)]
    pub webhook_table: Option<PathBuf>,

    /// Column of the lookup table holding the webhook URL (default: primary field)
    #[arg(long = "webhook-column", value_name = "NAME", global = true)]
    pub webhook_column: Option<String>,

    /// Maximum number of job status queries
    #[arg(long = "poll-attempts", global = true)]
    pub poll_attempts: Option<u32>,

    /// Wait between job status queries in milliseconds
    #[arg(long = "poll-interval-ms", global = true)]
    pub poll_interval_ms: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Payload field every record must carry (can be specified multiple times)
    #[arg(long = "required-field", value_name = "FIELD", global = true)]
    pub required_fields: Vec<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for task-sync
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "task-sync.toml")]
        output: PathBuf,
    },

    /// Submit a batch of records and wait for the outcome
    Submit {
        /// JSON file with an array of `{ "recordId", "payload" }` objects
        records: PathBuf,

        /// Log what would be submitted without sending anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Follow an already submitted job until it finishes
    Status {
        /// Job id returned by an earlier submission
        job_id: String,

        /// Number of records originally submitted (default: number of returned results)
        #[arg(long)]
        expected: Option<usize>,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
