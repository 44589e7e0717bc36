//! Image downloads and request pacing.
//!
//! This module provides the streaming image downloader used for eligible
//! records, and the global rate limiter that paces catalog traffic.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large images)
//! - Display-resolution URL rewrite before fetching
//! - Extension inference from Content-Type, then URL, then `.jpg`
//! - Separate, longer timeout than metadata fetches (30s by default)
//! - Structured error types carrying the record ID
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::download::{AssetDownloader, AssetSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = AssetDownloader::new("./images");
//! let name = downloader
//!     .download("https://images.example.org/CRDImages/ep/original/DT1567.jpg", 436_535)
//!     .await?;
//! println!("Downloaded: {name}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod filename;
pub mod rate_limiter;

pub use client::{AssetDownloader, AssetSink};
pub use error::DownloadError;
pub use filename::{
    DEFAULT_EXTENSION, DISPLAY_SEGMENT, ORIGINAL_SEGMENT, choose_extension, display_image_url,
    image_filename,
};
pub use rate_limiter::RateLimiter;

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
