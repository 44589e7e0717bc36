//! Durable, resumable metadata collection.
//!
//! The [`ResumableStore`] owns the in-memory list of persisted records and the
//! set of IDs they cover. It is loaded once at startup from the output file,
//! grows by appends during a run, and is written back wholesale at every
//! checkpoint and once more when the run ends.
//!
//! Writes go to a sibling `.tmp` file which is synced and then renamed over
//! the target, so a crash mid-write leaves the previous checkpoint intact.

mod error;
mod resumable;

pub use error::StoreError;
pub use resumable::{DEFAULT_CHECKPOINT_INTERVAL, LoadStatus, ResumableStore};
