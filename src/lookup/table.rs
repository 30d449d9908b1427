//! Lookup of the webhook URL from a lookup table export.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{LookupError, WebhookLookup};
use crate::json::is_truthy;

/// Reads the webhook URL from the first populated cell of a table export.
///
/// The export is JSON of the form:
///
/// ```json
/// {
///   "fields": [{ "id": "fld1", "name": "URL", "isPrimary": true }],
///   "records": [{ "fields": { "fld1": [{ "type": "url", "link": "https://..." }] } }]
/// }
/// ```
///
/// The column is the one named by [`with_column`](Self::with_column), or
/// else the first field flagged `isPrimary`, or else the first field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFileLookup {
    path: PathBuf,
    column: Option<String>,
}

impl TableFileLookup {
    /// Creates a lookup reading the table export at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            column: None,
        }
    }

    /// Selects the column by field name or id instead of the primary field.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Returns the table file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extracts the cell text from an already loaded table export.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the content is malformed or no record
    /// has a value in the selected column.
    pub fn read_cell(content: &str, column: Option<&str>) -> Result<String, LookupError> {
        let table: TableExport = serde_json::from_str(content)?;
        let field_id = select_field(&table.fields, column)?;

        if table.records.is_empty() {
            return Err(LookupError::NoRecords);
        }

        table
            .records
            .iter()
            .filter_map(|record| record.fields.get(field_id))
            .find(|cell| is_truthy(cell))
            .map(cell_to_text)
            .ok_or_else(|| LookupError::NoUsableCell(field_id.to_string()))
    }
}

impl WebhookLookup for TableFileLookup {
    async fn lookup(&self) -> Result<String, LookupError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LookupError::FileRead {
                path: self.path.clone(),
                source: e,
            })?;

        Self::read_cell(&content, self.column.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct TableExport {
    #[serde(default)]
    fields: Vec<FieldMeta>,
    #[serde(default)]
    records: Vec<TableRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldMeta {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_primary: bool,
}

#[derive(Debug, Deserialize)]
struct TableRecord {
    #[serde(default)]
    fields: Map<String, Value>,
}

fn select_field<'a>(fields: &'a [FieldMeta], column: Option<&str>) -> Result<&'a str, LookupError> {
    let first = fields.first().ok_or(LookupError::NoFields)?;

    let field = match column {
        Some(column) => fields
            .iter()
            .find(|f| f.name.as_deref() == Some(column) || f.id == column)
            .ok_or_else(|| LookupError::UnknownColumn(column.to_string()))?,
        None => fields.iter().find(|f| f.is_primary).unwrap_or(first),
    };

    if field.id.trim().is_empty() {
        return Err(LookupError::BlankFieldId);
    }
    Ok(&field.id)
}

/// Flattens a table cell value into plain text.
///
/// Strings and numbers are used as-is, arrays are concatenated, and objects
/// contribute the first string among `link`, `text`, `name`, `value`.
/// Anything else yields an empty string.
#[must_use]
pub fn cell_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(cell_to_text).collect(),
        Value::Object(obj) => ["link", "text", "name", "value"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        Value::Null | Value::Bool(_) => String::new(),
    }
}
