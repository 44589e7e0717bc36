//! Loading the list of record IDs to harvest.
//!
//! The input is a JSON document holding either a flat array of IDs
//! (`[1, 2, 3]`) or an object with an `objectIDs` array, which is the shape
//! the collection API's own list and search endpoints return. Anything else
//! is an [`InputError`] and aborts the run before any record is processed.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::RecordId;

/// Errors that can occur while loading the ID list.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file could not be read.
    #[error("failed to read ID list {path}: {source}")]
    Read {
        /// The input path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON, or not one of the accepted shapes.
    #[error(
        "malformed ID list {path}: expected an array of IDs or an object with an 'objectIDs' array ({reason})"
    )]
    Malformed {
        /// The input path, or `<inline>` for in-memory input.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}

/// The two accepted input shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdList {
    Flat(Vec<RecordId>),
    Wrapped {
        #[serde(rename = "objectIDs")]
        object_ids: Vec<RecordId>,
    },
}

impl From<IdList> for Vec<RecordId> {
    fn from(list: IdList) -> Self {
        match list {
            IdList::Flat(ids) | IdList::Wrapped { object_ids: ids } => ids,
        }
    }
}

/// Parses an ID list from JSON text, preserving order.
///
/// # Errors
///
/// Returns [`InputError::Malformed`] if the text is not an array of
/// non-negative integers or an object with such an `objectIDs` array.
///
/// # Examples
///
/// ```
/// use harvester_core::input::parse_record_ids;
///
/// assert_eq!(parse_record_ids("[3, 1, 2]").unwrap(), vec![3, 1, 2]);
/// assert_eq!(
///     parse_record_ids(r#"{"total": 2, "objectIDs": [5, 6]}"#).unwrap(),
///     vec![5, 6]
/// );
/// assert!(parse_record_ids(r#"{"ids": [1]}"#).is_err());
/// ```
pub fn parse_record_ids(raw: &str) -> Result<Vec<RecordId>, InputError> {
    parse_with_path(raw, Path::new("<inline>"))
}

/// Loads the ID list from a JSON file.
///
/// # Errors
///
/// Returns [`InputError::Read`] if the file cannot be read, or
/// [`InputError::Malformed`] if its content is not an accepted shape.
#[instrument(fields(path = %path.display()))]
pub fn load_record_ids(path: &Path) -> Result<Vec<RecordId>, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let ids = parse_with_path(&raw, path)?;
    debug!(count = ids.len(), "loaded record ids");
    Ok(ids)
}

fn parse_with_path(raw: &str, path: &Path) -> Result<Vec<RecordId>, InputError> {
    serde_json::from_str::<IdList>(raw)
        .map(Vec::from)
        .map_err(|e| InputError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flat_array_preserves_order() {
        assert_eq!(parse_record_ids("[10, 2, 33]").unwrap(), vec![10, 2, 33]);
    }

    #[test]
    fn test_parse_wrapped_object_ignores_other_fields() {
        let ids = parse_record_ids(r#"{"total": 3, "objectIDs": [1, 2, 3]}"#).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_empty_array_is_valid() {
        assert!(parse_record_ids("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_unrecognized_object() {
        let result = parse_record_ids(r#"{"ids": [1, 2]}"#);
        assert!(matches!(result, Err(InputError::Malformed { .. })));
    }

    #[test]
    fn test_parse_rejects_null_object_ids() {
        let result = parse_record_ids(r#"{"objectIDs": null}"#);
        assert!(matches!(result, Err(InputError::Malformed { .. })));
    }

    #[test]
    fn test_parse_rejects_non_integer_entries() {
        assert!(parse_record_ids(r#"[1, "two", 3]"#).is_err());
        assert!(parse_record_ids("[1, -2]").is_err());
        assert!(parse_record_ids("[1.5]").is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = parse_record_ids("not json");
        assert!(matches!(result, Err(InputError::Malformed { .. })));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = load_record_ids(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(InputError::Read { .. })));
    }

    #[test]
    fn test_load_reports_path_in_malformed_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ids.json");
        std::fs::write(&path, "{\"unexpected\": true}").unwrap();

        let error = load_record_ids(&path).unwrap_err();
        assert!(error.to_string().contains("ids.json"), "got: {error}");
    }
}
