//! Harvester Core Library
//!
//! This library provides the core functionality for the harvester tool,
//! which walks a list of catalog record IDs, fetches each record from a
//! museum collection API, keeps the public-domain ones that have an image,
//! downloads the image, and persists the metadata to a resumable JSON store.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Record model, catalog API client, eligibility filter, projector
//! - [`download`] - Rate limiting and streaming asset downloads
//! - [`store`] - Resumable metadata store with periodic checkpoints
//! - [`pipeline`] - Per-ID state machine that drives a harvest run
//! - [`input`] - ID list loading
//! - [`export`] - One-shot transforms over the harvested metadata file

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;
pub mod export;
pub mod input;
pub mod pipeline;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use catalog::{
    CatalogClient, FetchError, Ineligibility, PersistedRecord, RawRecord, RecordId, RecordSource,
    check_eligibility, is_eligible, project,
};
pub use download::{AssetDownloader, AssetSink, DownloadError, RateLimiter};
pub use input::{InputError, load_record_ids, parse_record_ids};
pub use pipeline::{
    DEFAULT_CONCURRENCY, Pipeline, PipelineError, PipelineOptions, RecordOutcome, RunStats,
    RunSummary,
};
pub use store::{DEFAULT_CHECKPOINT_INTERVAL, LoadStatus, ResumableStore, StoreError};
