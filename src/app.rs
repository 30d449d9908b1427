//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use task_sync::config::ConfigError;
use task_sync::sync::{ErrorKind, SyncError};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::run::{Report, RunError};

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    use crate::run::{Report, RunError};

    /// Success (exit code 0), including batches still in progress upstream.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, missing endpoint, unreadable records, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - network failure, remote error, poll timeout, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// Sync failed (exit code 3) - the remote reported failed records.
    pub fn sync_failed() -> ExitCode {
        ExitCode::from(3)
    }

    /// Exit code for a completed run.
    pub fn for_report(report: &Report) -> ExitCode {
        if report.has_failures() {
            sync_failed()
        } else {
            SUCCESS
        }
    }

    /// Exit code for a failed run.
    pub fn for_error(error: &RunError) -> ExitCode {
        if error.is_config() {
            CONFIG_ERROR
        } else {
            runtime_error()
        }
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    if let ConfigError::FileRead { .. } = error {
        eprintln!("\nRun 'task-sync init' to generate a configuration template.");
    }
}

/// Prints helpful hints for common runtime errors.
pub fn print_run_hint(error: &RunError) {
    match error {
        RunError::Sync(SyncError::Timeout { job_id, .. }) => {
            eprintln!("\nThe job may still finish. Check again with 'task-sync status {job_id}'.");
        }
        RunError::Sync(e) if e.kind() == ErrorKind::Config => {
            eprintln!("\nRun 'task-sync init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Prints the outcome of a completed run.
pub fn print_report(report: &Report) {
    if report.has_failures() {
        eprintln!("{report}");
    } else {
        println!("{report}");
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
