//! Error types for webhook URL lookups.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for [`WebhookLookup`](super::WebhookLookup) implementations.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Neither a webhook URL nor a lookup table is configured.
    #[error("No webhook URL source configured (set webhook.url or webhook.table)")]
    NotConfigured,

    /// Failed to read the lookup table file.
    #[error("Failed to read lookup table '{}': {source}", path.display())]
    FileRead {
        /// Path to the table file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The lookup table is not valid JSON of the expected shape.
    #[error("Failed to parse lookup table: {0}")]
    Parse(#[from] serde_json::Error),

    /// The lookup table declares no fields.
    #[error("Lookup table has no fields")]
    NoFields,

    /// The requested column does not exist in the table.
    #[error("Lookup table has no column named '{0}'")]
    UnknownColumn(String),

    /// The selected field has a blank identifier.
    #[error("Cannot determine the primary field of the lookup table")]
    BlankFieldId,

    /// The lookup table has no records.
    #[error("Lookup table has no records")]
    NoRecords,

    /// No record holds a value in the selected column.
    #[error("No record in the lookup table has a value in column '{0}'")]
    NoUsableCell(String),
}
