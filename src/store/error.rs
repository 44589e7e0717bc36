//! Error types for the resumable store.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while writing the durable collection.
///
/// Load failures are not errors: an unreadable or corrupt file degrades to an
/// empty store (see [`LoadStatus`](super::LoadStatus)).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing, syncing, or renaming the output file failed.
    #[error("failed to write metadata to {path}: {source}")]
    Write {
        /// The file or directory being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The collection could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a write error for `path`.
    #[must_use]
    pub fn write(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
