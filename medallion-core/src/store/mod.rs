//! Table store abstraction
//!
//! Pipelines address datasets by identifiers such as `bronze.events`. The
//! store maps those identifiers to rows. Rows are JSON objects so that
//! built-in and scripted pipelines can share one representation.

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::params::DATE_FORMAT;

/// A single table row
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur when using a table store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier cannot be mapped to a table
    #[error("invalid table identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: &'static str },

    /// Table has never been written
    #[error("table '{0}' does not exist")]
    NotFound(TableId),

    /// Underlying file operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored line is not a JSON object
    #[error("malformed row at {}:{line}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A row could not be encoded
    #[error("failed to encode row for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Identifier of a table, `layer.name` or a bare `name`
///
/// Only the first `.` separates the layer, so `silver.events.v2` has layer
/// `silver` and name `events.v2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableId {
    layer: Option<String>,
    name: String,
}

impl TableId {
    /// Parse a table identifier
    ///
    /// # Errors
    /// Returns `StoreError::InvalidIdentifier` if a component is empty, is `.`
    /// or `..`, or contains a path separator.
    pub fn parse(id: &str) -> Result<Self, StoreError> {
        let invalid = |reason| StoreError::InvalidIdentifier {
            id: id.to_string(),
            reason,
        };

        let (layer, name) = match id.split_once('.') {
            Some((layer, name)) => (Some(layer), name),
            None => (None, id),
        };

        for component in layer.into_iter().chain(std::iter::once(name)) {
            if component.trim().is_empty() {
                return Err(invalid("empty component"));
            }
            if component == "." || component == ".." {
                return Err(invalid("relative path component"));
            }
            if component.contains(['/', '\\', '\0']) {
                return Err(invalid("contains a path separator"));
            }
        }

        Ok(Self {
            layer: layer.map(str::to_string),
            name: name.to_string(),
        })
    }

    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the table relative to a store root
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        let file = format!("{}.{}", self.name, extension);
        match &self.layer {
            Some(layer) => PathBuf::from(layer).join(file),
            None => PathBuf::from(file),
        }
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.layer {
            Some(layer) => write!(f, "{}.{}", layer, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl std::str::FromStr for TableId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Storage backend used by pipelines
///
/// Implementations must be usable from script callbacks, hence `Send + Sync`.
pub trait TableStore: Send + Sync {
    /// Whether the table has been written
    fn exists(&self, table: &TableId) -> Result<bool, StoreError>;

    /// Read every row of a table
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the table does not exist.
    fn read(&self, table: &TableId) -> Result<Vec<Row>, StoreError>;

    /// Replace the full contents of a table
    fn write(&self, table: &TableId, rows: &[Row]) -> Result<(), StoreError>;

    /// Read a table, treating a missing table as empty
    fn read_or_empty(&self, table: &TableId) -> Result<Vec<Row>, StoreError> {
        match self.read(table) {
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}

/// Extract the date stored in `column`
///
/// Accepts a plain `YYYY-MM-DD` string or a timestamp string starting with
/// one (`2024-01-05T10:00:00Z`). Anything else yields `None`.
pub fn row_date(row: &Row, column: &str) -> Option<NaiveDate> {
    parse_day(row.get(column)?.as_str()?)
}

/// Parse a `YYYY-MM-DD` date, optionally followed by a time part
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let day = text.get(..10)?;
    if text.len() > 10 && !text[10..].starts_with(['T', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_parse_layered_identifier() {
        let id = TableId::parse("bronze.events").unwrap();
        assert_eq!(id.layer(), Some("bronze"));
        assert_eq!(id.name(), "events");
        assert_eq!(id.to_string(), "bronze.events");
        assert_eq!(
            id.relative_path("jsonl"),
            PathBuf::from("bronze").join("events.jsonl")
        );
    }

    #[test]
    fn test_parse_bare_and_dotted_names() {
        let bare: TableId = "events".parse().unwrap();
        assert_eq!(bare.layer(), None);
        assert_eq!(bare.relative_path("jsonl"), PathBuf::from("events.jsonl"));

        let dotted = TableId::parse("silver.events.v2").unwrap();
        assert_eq!(dotted.layer(), Some("silver"));
        assert_eq!(dotted.name(), "events.v2");
    }

    #[test]
    fn test_rejects_unsafe_identifiers() {
        for id in ["", ".events", "bronze.", "../etc.passwd", "bronze.a/b", "bronze.."] {
            assert!(
                matches!(
                    TableId::parse(id),
                    Err(StoreError::InvalidIdentifier { .. })
                ),
                "accepted {:?}",
                id
            );
        }
    }

    #[test]
    fn test_row_date() {
        let r = row(json!({
            "plain": "2024-01-05",
            "ts": "2024-01-05T10:00:00Z",
            "bad": "2024-13-01",
            "junk": "2024-01-05xyz",
            "num": 20240105
        }));

        let expected = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(row_date(&r, "plain"), expected);
        assert_eq!(row_date(&r, "ts"), expected);
        assert_eq!(row_date(&r, "bad"), None);
        assert_eq!(row_date(&r, "junk"), None);
        assert_eq!(row_date(&r, "num"), None);
        assert_eq!(row_date(&r, "missing"), None);
    }
}
