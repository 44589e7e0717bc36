//! Error types for catalog record fetches.

use thiserror::Error;

use super::RecordId;

/// Errors that can occur while fetching a single catalog record.
///
/// Every variant carries the record ID. A fetch error is never fatal to a
/// harvest run; the pipeline records it and moves on to the next ID.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching record {id}: {source}")]
    Network {
        /// The record that failed to fetch.
        id: RecordId,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching record {id}")]
    Timeout {
        /// The record that timed out.
        id: RecordId,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching record {id}")]
    HttpStatus {
        /// The record that returned an error status.
        id: RecordId,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not a JSON object.
    #[error("malformed response body for record {id}: {reason}")]
    MalformedBody {
        /// The record whose body could not be parsed.
        id: RecordId,
        /// Parser message.
        reason: String,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid catalog URL: {url}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
    },

    /// A search request (not tied to a single record) failed.
    #[error("search request {url} failed: {reason}")]
    Search {
        /// The search URL.
        url: String,
        /// Human-readable cause.
        reason: String,
    },
}

impl FetchError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_transport(id: RecordId, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { id }
        } else {
            Self::Network { id, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(id: RecordId, status: u16) -> Self {
        Self::HttpStatus { id, status }
    }

    /// Creates a malformed-body error.
    pub fn malformed(id: RecordId, reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            id,
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a search failure.
    pub fn search(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Search {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns the record ID the error belongs to, if any.
    #[must_use]
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Network { id, .. }
            | Self::Timeout { id }
            | Self::HttpStatus { id, .. }
            | Self::MalformedBody { id, .. } => Some(*id),
            Self::InvalidUrl { .. } | Self::Search { .. } => None,
        }
    }
}
