//! Catalog records and the collection API.
//!
//! This module holds everything that knows about the shape of a catalog
//! record: the raw API response, the persisted projection, the eligibility
//! policy, and the HTTP client that fetches records by ID.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::catalog::{CatalogClient, RecordSource, is_eligible, project};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(harvester_core::catalog::DEFAULT_BASE_URL)?;
//! let raw = client.fetch(436_535).await?;
//! if is_eligible(&raw) {
//!     let record = project(436_535, &raw, None);
//!     println!("{}", record.title);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod filter;
mod projector;
mod record;

pub use client::{
    CatalogClient, DEFAULT_BASE_URL, DEFAULT_SEARCH_QUERY, DEFAULT_SEARCH_URL, RecordSource,
};
pub use error::FetchError;
pub use filter::{Ineligibility, check_eligibility, is_eligible};
pub use projector::project;
pub use record::{PersistedRecord, RawRecord, RecordId, SearchResponse};
