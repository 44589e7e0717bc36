//! The resumable store and its checkpoint policy.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::error::StoreError;
use crate::catalog::{PersistedRecord, RecordId};

/// Default number of accepted records between checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;

/// What [`ResumableStore::load`] found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// An existing collection was loaded.
    ///
    /// Entries that do not parse as records are skipped, and the file is
    /// copied beside itself with a `.corrupt` suffix before it is rewritten.
    Loaded {
        /// Number of records loaded.
        count: usize,
    },
    /// No output file existed yet.
    Fresh,
    /// The output file was unreadable or not a JSON array.
    ///
    /// The store starts empty; a copy of the bad file is kept beside it with
    /// a `.corrupt` suffix when possible.
    Corrupt {
        /// Why the file was rejected.
        reason: String,
    },
}

impl LoadStatus {
    /// Returns `true` unless an existing collection was loaded.
    #[must_use]
    pub fn is_fresh_start(&self) -> bool {
        !matches!(self, Self::Loaded { .. })
    }
}

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<PersistedRecord>,
    processed: HashSet<RecordId>,
    /// IDs claimed by a worker but not yet stored.
    in_flight: HashSet<RecordId>,
}

/// In-memory metadata collection with write-through checkpoints.
///
/// All operations take one internal lock, so a store shared across worker
/// tasks never interleaves an append with a flush. A store created with
/// [`in_memory`](Self::in_memory) has no backing file and its flushes are
/// no-ops.
#[derive(Debug)]
pub struct ResumableStore {
    path: Option<PathBuf>,
    checkpoint_interval: usize,
    state: Mutex<StoreState>,
    flush_count: AtomicUsize,
}

impl ResumableStore {
    /// Loads the collection at `path`.
    ///
    /// Never fails: a missing file yields [`LoadStatus::Fresh`], and an
    /// unreadable file or one that is not a JSON array yields
    /// [`LoadStatus::Corrupt`]. Either way the returned store is empty.
    /// Inside an array, each entry is parsed on its own and unreadable
    /// entries are dropped. A `checkpoint_interval` of zero is treated as one.
    #[instrument(fields(path = %path.display()))]
    pub async fn load(path: &Path, checkpoint_interval: usize) -> (Self, LoadStatus) {
        let (records, status) = match tokio::fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<serde_json::Value>>(&bytes) {
                Ok(entries) => {
                    let (records, dropped) = parse_entries(entries);
                    if dropped > 0 {
                        warn!(dropped, "metadata file has unreadable entries");
                        preserve_corrupt(path).await;
                    }
                    let count = records.len();
                    info!(count, "loaded existing metadata");
                    (records, LoadStatus::Loaded { count })
                }
                Err(e) => {
                    warn!(error = %e, "metadata file is corrupt, starting fresh");
                    preserve_corrupt(path).await;
                    (
                        Vec::new(),
                        LoadStatus::Corrupt {
                            reason: e.to_string(),
                        },
                    )
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no existing metadata, starting fresh");
                (Vec::new(), LoadStatus::Fresh)
            }
            Err(e) => {
                warn!(error = %e, "metadata file is unreadable, starting fresh");
                (
                    Vec::new(),
                    LoadStatus::Corrupt {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let store = Self::from_records(Some(path.to_path_buf()), records, checkpoint_interval);
        (store, status)
    }

    /// Creates an empty store with no backing file.
    #[must_use]
    pub fn in_memory(checkpoint_interval: usize) -> Self {
        Self::from_records(None, Vec::new(), checkpoint_interval)
    }

    fn from_records(
        path: Option<PathBuf>,
        records: Vec<PersistedRecord>,
        checkpoint_interval: usize,
    ) -> Self {
        let processed = records.iter().map(|r| r.object_id).collect();
        Self {
            path,
            checkpoint_interval: checkpoint_interval.max(1),
            state: Mutex::new(StoreState {
                records,
                processed,
                in_flight: HashSet::new(),
            }),
            flush_count: AtomicUsize::new(0),
        }
    }

    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the number of accepted records between checkpoints.
    #[must_use]
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    /// Returns how many times the collection has been written to disk.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flush_count.load(Ordering::SeqCst)
    }

    /// Returns `true` if a record for `id` is already in the collection.
    pub async fn contains(&self, id: RecordId) -> bool {
        self.state.lock().await.processed.contains(&id)
    }

    /// Claims `id` for one worker.
    ///
    /// Returns `false` if the ID is already stored or claimed by another
    /// worker. A claim ends when the record is appended or on
    /// [`release`](Self::release).
    pub async fn try_claim(&self, id: RecordId) -> bool {
        let mut state = self.state.lock().await;
        if state.processed.contains(&id) {
            return false;
        }
        state.in_flight.insert(id)
    }

    /// Drops the claim on `id` without storing a record.
    pub async fn release(&self, id: RecordId) {
        self.state.lock().await.in_flight.remove(&id);
    }

    /// Returns the number of records in the collection.
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// Returns `true` if the collection holds no records.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.records.is_empty()
    }

    /// Returns a copy of every record, in insertion order.
    pub async fn snapshot(&self) -> Vec<PersistedRecord> {
        self.state.lock().await.records.clone()
    }

    /// Returns a copy of the processed-ID set.
    pub async fn processed_ids(&self) -> HashSet<RecordId> {
        self.state.lock().await.processed.clone()
    }

    /// Adds `record` to the collection in memory.
    ///
    /// Returns `false` and leaves the collection untouched if a record with
    /// the same ID is already present.
    pub async fn append(&self, record: PersistedRecord) -> bool {
        let mut state = self.state.lock().await;
        append_locked(&mut state, record)
    }

    /// Flushes the collection if its size is a multiple of the checkpoint
    /// interval. Returns whether a flush happened.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the flush fails.
    pub async fn maybe_checkpoint(&self) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        self.checkpoint_locked(&state).await
    }

    /// Appends `record` and runs the checkpoint policy under one lock.
    ///
    /// Returns whether the record was appended. A duplicate is not appended
    /// and never triggers a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a due checkpoint fails. The record stays in
    /// memory and is written by the next successful flush.
    pub async fn append_and_checkpoint(&self, record: PersistedRecord) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if !append_locked(&mut state, record) {
            return Ok(false);
        }
        self.checkpoint_locked(&state).await?;
        Ok(true)
    }

    /// Writes the whole collection to the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serializing, writing, syncing, or renaming
    /// fails. The previous file content is left in place in that case.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let state = self.state.lock().await;
        self.flush_locked(&state).await
    }

    async fn checkpoint_locked(&self, state: &StoreState) -> Result<bool, StoreError> {
        let len = state.records.len();
        if len == 0 || len % self.checkpoint_interval != 0 {
            return Ok(false);
        }
        debug!(len, interval = self.checkpoint_interval, "checkpoint due");
        self.flush_locked(state).await?;
        Ok(true)
    }

    async fn flush_locked(&self, state: &StoreState) -> Result<(), StoreError> {
        let Some(path) = self.path.as_deref() else {
            debug!("in-memory store, nothing to flush");
            return Ok(());
        };
        write_atomic(path, &state.records).await?;
        self.flush_count.fetch_add(1, Ordering::SeqCst);
        info!(
            count = state.records.len(),
            path = %path.display(),
            "metadata saved"
        );
        Ok(())
    }
}

fn append_locked(state: &mut StoreState, record: PersistedRecord) -> bool {
    state.in_flight.remove(&record.object_id);
    if !state.processed.insert(record.object_id) {
        debug!(id = record.object_id, "record already stored, not appending");
        return false;
    }
    state.records.push(record);
    true
}

/// Parses each array entry on its own. Returns the readable records and the
/// number of entries dropped.
fn parse_entries(entries: Vec<serde_json::Value>) -> (Vec<PersistedRecord>, usize) {
    let mut records = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<PersistedRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable metadata entry");
                dropped += 1;
            }
        }
    }
    (records, dropped)
}

/// Serializes `records` and replaces `path` via a synced sibling temp file.
async fn write_atomic(path: &Path, records: &[PersistedRecord]) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::write(parent, e))?;
    }

    let temp_path = sibling_path(path, "tmp");
    let result = match write_synced(&temp_path, &body).await {
        Ok(()) => tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| StoreError::write(path, e)),
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}

async fn write_synced(path: &Path, body: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| StoreError::write(path, e))?;
    file.write_all(body)
        .await
        .map_err(|e| StoreError::write(path, e))?;
    file.flush().await.map_err(|e| StoreError::write(path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::write(path, e))?;
    Ok(())
}

/// Best-effort copy of a rejected output file, so the next flush does not
/// destroy the only copy.
async fn preserve_corrupt(path: &Path) {
    let backup = sibling_path(path, "corrupt");
    match tokio::fs::copy(path, &backup).await {
        Ok(_) => warn!(backup = %backup.display(), "kept a copy of the corrupt metadata file"),
        Err(e) => warn!(error = %e, "could not copy the corrupt metadata file"),
    }
}

/// `metadata.json` -> `metadata.json.{suffix}`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
