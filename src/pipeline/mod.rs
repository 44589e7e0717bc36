//! Harvest driver.
//!
//! The [`Pipeline`] walks an ordered list of record IDs and moves each one
//! through skip-if-processed, fetch, eligibility, image download, projection,
//! and storage. Every ID ends in exactly one [`RecordOutcome`]; per-ID
//! failures are logged and counted but never stop the run. Only a store write
//! failure is fatal.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use harvester_core::{
//!     CatalogClient, Pipeline, PipelineOptions, RateLimiter, ResumableStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(CatalogClient::new(harvester_core::catalog::DEFAULT_BASE_URL)?);
//! let (store, _status) = ResumableStore::load(Path::new("metadata.json"), 10).await;
//! let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
//! let pipeline = Pipeline::new(
//!     source,
//!     None,
//!     Arc::new(store),
//!     limiter,
//!     PipelineOptions::default(),
//! )?;
//! let summary = pipeline.run(&[45734, 436_535], &AtomicBool::new(false)).await?;
//! println!("stored {} of {}", summary.succeeded, summary.attempted);
//! # Ok(())
//! # }
//! ```

mod driver;
mod stats;

pub use driver::{
    DEFAULT_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL, MAX_CONCURRENCY, MIN_CONCURRENCY, Pipeline,
    PipelineError, PipelineOptions,
};
pub use stats::{RecordOutcome, RunStats, RunSummary};
