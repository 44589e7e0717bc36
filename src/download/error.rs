//! Error types for the download module.
//!
//! This module defines structured errors for image downloads. Every variant
//! names the record the image belongs to, so a failure can be logged and
//! counted without further context.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::RecordId;

/// Errors that can occur during an image download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading image for record {id} from {url}: {source}")]
    Network {
        /// The record the image belongs to.
        id: RecordId,
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading image for record {id} from {url}")]
    Timeout {
        /// The record the image belongs to.
        id: RecordId,
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading image for record {id} from {url}")]
    HttpStatus {
        /// The record the image belongs to.
        id: RecordId,
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create directory, create file, write).
    #[error("IO error writing image for record {id} to {path}: {source}")]
    Io {
        /// The record the image belongs to.
        id: RecordId,
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The image URL is malformed or invalid.
    #[error("invalid image URL for record {id}: {url}")]
    InvalidUrl {
        /// The record the image belongs to.
        id: RecordId,
        /// The invalid URL string.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_transport(id: RecordId, url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                id,
                url: url.into(),
            }
        } else {
            Self::Network {
                id,
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(id: RecordId, url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            id,
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(id: RecordId, url: impl Into<String>) -> Self {
        Self::Timeout {
            id,
            url: url.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(id: RecordId, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            id,
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(id: RecordId, url: impl Into<String>) -> Self {
        Self::InvalidUrl {
            id,
            url: url.into(),
        }
    }

    /// Returns the record the failed image belongs to.
    #[must_use]
    pub fn record_id(&self) -> RecordId {
        match self {
            Self::Network { id, .. }
            | Self::Timeout { id, .. }
            | Self::HttpStatus { id, .. }
            | Self::Io { id, .. }
            | Self::InvalidUrl { id, .. } => *id,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// record ID and URL or path, which the source errors do not carry.
