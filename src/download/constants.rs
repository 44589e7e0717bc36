//! Constants for HTTP clients and pacing (timeouts, rate limiting).

/// Default HTTP connect timeout for both clients (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total timeout for a catalog metadata fetch (15 seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 15;

/// Default total timeout for an image download (30 seconds; images are larger).
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Default minimum spacing between catalog requests in milliseconds.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;
