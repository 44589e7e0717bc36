//! One-shot transforms over a harvested metadata file.
//!
//! These run after (or between) harvest runs and never touch the network:
//! - [`extract_ids`] lists the stored IDs, sorted, for feeding back as input
//! - [`split_records`] writes one `{id}.json` file per record
//! - [`export_csv`] writes a CSV summary of records that have an image
//!
//! This module is a single file; the feature scope is small enough not to
//! warrant sub-files.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{PersistedRecord, RecordId};

/// Column order of the CSV export.
pub const CSV_COLUMNS: [&str; 6] = ["objectID", "title", "artist", "date", "medium", "primaryImage"];

/// Errors produced by the export commands.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The metadata file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata file is not a JSON array of records.
    #[error("{path} is not a metadata collection: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An output file or directory could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (shouldn't occur for well-formed records).
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing a CSV row failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One row of the CSV export.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "objectID")]
    object_id: RecordId,
    title: &'a str,
    artist: &'a str,
    date: &'a str,
    medium: &'a str,
    #[serde(rename = "primaryImage")]
    primary_image: &'a str,
}

impl<'a> From<&'a PersistedRecord> for CsvRow<'a> {
    fn from(record: &'a PersistedRecord) -> Self {
        Self {
            object_id: record.object_id,
            title: &record.title,
            artist: &record.artist_display_name,
            date: &record.object_date,
            medium: &record.medium,
            primary_image: &record.primary_image,
        }
    }
}

/// Reads a metadata file written by the harvester.
///
/// # Errors
///
/// Returns [`ExportError::Read`] if the file cannot be read, or
/// [`ExportError::Parse`] if it is not a JSON array of records.
#[instrument(fields(path = %path.display()))]
pub fn load_collection(path: &Path) -> Result<Vec<PersistedRecord>, ExportError> {
    let bytes = fs::read(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<PersistedRecord> =
        serde_json::from_slice(&bytes).map_err(|source| ExportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    info!(count = records.len(), "loaded metadata");
    Ok(records)
}

/// Returns every record ID, sorted ascending.
///
/// # Examples
///
/// ```
/// use harvester_core::PersistedRecord;
/// use harvester_core::export::extract_ids;
///
/// let records: Vec<PersistedRecord> = [9, 2, 5]
///     .into_iter()
///     .map(|id| PersistedRecord { object_id: id, ..PersistedRecord::default() })
///     .collect();
/// assert_eq!(extract_ids(&records), vec![2, 5, 9]);
/// ```
#[must_use]
pub fn extract_ids(records: &[PersistedRecord]) -> Vec<RecordId> {
    let mut ids: Vec<RecordId> = records.iter().map(|r| r.object_id).collect();
    ids.sort_unstable();
    ids
}

/// Writes `ids` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_id_list(path: &Path, ids: &[RecordId]) -> Result<(), ExportError> {
    write_json(path, &ids)?;
    info!(count = ids.len(), path = %path.display(), "wrote id list");
    Ok(())
}

/// Writes each record to `{dir}/{id}.json`, creating `dir` if needed.
///
/// Existing files are overwritten. Returns the number of files written.
///
/// # Errors
///
/// Returns [`ExportError`] on the first file that cannot be written.
#[instrument(skip(records), fields(count = records.len(), dir = %dir.display()))]
pub fn split_records(records: &[PersistedRecord], dir: &Path) -> Result<usize, ExportError> {
    fs::create_dir_all(dir).map_err(|e| ExportError::write(dir, e))?;

    for (index, record) in records.iter().enumerate() {
        let path = dir.join(format!("{}.json", record.object_id));
        write_json(&path, record)?;
        if (index + 1) % 100 == 0 {
            debug!(written = index + 1, "split progress");
        }
    }

    info!(count = records.len(), "wrote per-record files");
    Ok(records.len())
}

/// Writes a CSV summary of the records that have a primary image.
///
/// The header row is always written, with the columns in [`CSV_COLUMNS`]
/// order. Returns the number of data rows.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or a row cannot be
/// written.
#[instrument(skip(records), fields(count = records.len(), path = %path.display()))]
pub fn export_csv(records: &[PersistedRecord], path: &Path) -> Result<usize, ExportError> {
    create_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(CSV_COLUMNS)?;

    let mut rows = 0;
    for record in records {
        if record.primary_image.trim().is_empty() {
            continue;
        }
        writer.serialize(CsvRow::from(record))?;
        rows += 1;
    }
    writer.flush().map_err(|e| ExportError::write(path, e))?;

    let skipped = records.len() - rows;
    if skipped > 0 {
        warn!(skipped, "records without a primary image left out of the CSV");
    }
    info!(rows, "wrote CSV export");
    Ok(rows)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    create_parent(path)?;
    let file = fs::File::create(path).map_err(|e| ExportError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    std::io::Write::flush(&mut writer).map_err(|e| ExportError::write(path, e))?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ExportError::write(parent, e))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: RecordId, image: &str) -> PersistedRecord {
        PersistedRecord {
            object_id: id,
            title: format!("Title, {id}"),
            artist_display_name: "Kiyohara Yukinobu".to_string(),
            object_date: "late 17th century".to_string(),
            medium: "Hanging scroll; ink and color on silk".to_string(),
            primary_image: image.to_string(),
            is_public_domain: true,
            ..PersistedRecord::default()
        }
    }

    fn write_collection(dir: &Path, records: &[PersistedRecord]) -> PathBuf {
        let path = dir.join("metadata.json");
        fs::write(&path, serde_json::to_vec(records).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_collection_round_trip() {
        let temp = TempDir::new().unwrap();
        let records = vec![record(1, "a.jpg"), record(2, "")];
        let path = write_collection(temp.path(), &records);

        assert_eq!(load_collection(&path).unwrap(), records);
    }

    #[test]
    fn test_load_collection_rejects_id_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ids.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            load_collection(&path),
            Err(ExportError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_collection_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_collection(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(ExportError::Read { .. })));
    }

    #[test]
    fn test_write_id_list_is_loadable_input() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("object_ids.json");
        let ids = extract_ids(&[record(30, ""), record(4, ""), record(17, "")]);

        write_id_list(&path, &ids).unwrap();

        let reloaded = crate::input::load_record_ids(&path).unwrap();
        assert_eq!(reloaded, vec![4, 17, 30]);
    }

    #[test]
    fn test_split_records_writes_one_file_per_record() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("metadata");
        let records = vec![record(1, "a.jpg"), record(2, "b.jpg")];

        assert_eq!(split_records(&records, &dir).unwrap(), 2);

        let one: PersistedRecord =
            serde_json::from_slice(&fs::read(dir.join("1.json")).unwrap()).unwrap();
        assert_eq!(one, records[0]);
        assert!(dir.join("2.json").exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
    }

    #[test]
    fn test_export_csv_keeps_only_records_with_images() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("objects.csv");
        let records = vec![
            record(1, "https://images.example.org/web-large/1.jpg"),
            record(2, ""),
            record(3, "https://images.example.org/web-large/3.jpg"),
        ];

        assert_eq!(export_csv(&records, &path).unwrap(), 2);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "objectID,title,artist,date,medium,primaryImage");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1,\"Title, 1\",Kiyohara Yukinobu,late 17th century,Hanging scroll; ink and color on silk,https://images.example.org/web-large/1.jpg"
        );
        assert!(lines[2].starts_with("3,"));
    }

    #[test]
    fn test_export_csv_empty_collection_writes_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("objects.csv");

        assert_eq!(export_csv(&[], &path).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "objectID,title,artist,date,medium,primaryImage\n"
        );
    }
}
