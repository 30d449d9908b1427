//! Webhook URL lookup collaborators.
//!
//! The [`WebhookResolver`](crate::sync::WebhookResolver) asks a
//! [`WebhookLookup`] for the destination URL the first time it is needed.
//! This module provides:
//! - A fixed URL taken from configuration ([`StaticLookup`])
//! - The first cell of a lookup table export ([`TableFileLookup`])
//! - A configuration-driven choice between the two ([`ConfiguredLookup`])

mod error;
mod table;


use std::future::Future;
use std::sync::Arc;

pub use error::LookupError;
pub use table::{TableFileLookup, cell_to_text};

/// Source of the webhook URL the remote automation forwards tasks to.
///
/// Implementations return the raw value; trimming and the blank check are
/// the resolver's job.
pub trait WebhookLookup: Send + Sync {
    /// Looks the webhook URL up.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the configured location cannot be read
    /// or holds no usable value.
    fn lookup(&self) -> impl Future<Output = Result<String, LookupError>> + Send;
}

impl<T: WebhookLookup> WebhookLookup for Arc<T> {
    fn lookup(&self) -> impl Future<Output = Result<String, LookupError>> + Send {
        (**self).lookup()
    }
}

/// Lookup that always yields the same configured URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLookup {
    url: String,
}

impl StaticLookup {
    /// Creates a lookup returning `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl WebhookLookup for StaticLookup {
    async fn lookup(&self) -> Result<String, LookupError> {
        Ok(self.url.clone())
    }
}

/// Lookup selected from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfiguredLookup {
    /// URL given directly in configuration.
    Static(StaticLookup),
    /// URL read from a lookup table export.
    Table(TableFileLookup),
    /// No webhook source configured; every lookup fails.
    Unconfigured,
}

impl WebhookLookup for ConfiguredLookup {
    async fn lookup(&self) -> Result<String, LookupError> {
        match self {
            Self::Static(inner) => inner.lookup().await,
            Self::Table(inner) => inner.lookup().await,
            Self::Unconfigured => Err(LookupError::NotConfigured),
        }
    }
}
