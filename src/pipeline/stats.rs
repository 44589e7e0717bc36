//! Per-ID outcomes and run statistics.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::catalog::Ineligibility;

/// Terminal state of a single record ID within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The ID was already stored or in flight in another task; no network
    /// call was made.
    SkippedProcessed,
    /// The record was fetched but is not eligible for harvesting.
    SkippedIneligible(Ineligibility),
    /// The record could not be fetched or parsed.
    FetchFailed,
    /// The record was eligible but its image download failed; nothing was stored.
    DownloadFailed,
    /// The record was stored.
    Succeeded,
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedProcessed => f.write_str("already processed"),
            Self::SkippedIneligible(reason) => write!(f, "ineligible ({reason})"),
            Self::FetchFailed => f.write_str("fetch failed"),
            Self::DownloadFailed => f.write_str("download failed"),
            Self::Succeeded => f.write_str("stored"),
        }
    }
}

/// Live counters for a harvest run.
///
/// Updated from concurrent worker tasks, so every counter is atomic.
/// `attempted` counts every ID taken from the list, which keeps it equal to
/// the sum of the outcome counters.
#[derive(Debug, Default)]
pub struct RunStats {
    attempted: AtomicUsize,
    skipped_processed: AtomicUsize,
    skipped_ineligible: AtomicUsize,
    fetch_failed: AtomicUsize,
    download_failed: AtomicUsize,
    succeeded: AtomicUsize,
}

impl RunStats {
    /// Creates a stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one terminal outcome and returns the new `attempted` count.
    pub fn record(&self, outcome: RecordOutcome) -> usize {
        let counter = match outcome {
            RecordOutcome::SkippedProcessed => &self.skipped_processed,
            RecordOutcome::SkippedIneligible(_) => &self.skipped_ineligible,
            RecordOutcome::FetchFailed => &self.fetch_failed,
            RecordOutcome::DownloadFailed => &self.download_failed,
            RecordOutcome::Succeeded => &self.succeeded,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.attempted.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns how many IDs have reached a terminal outcome.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.attempted.load(Ordering::SeqCst)
    }

    /// Returns how many IDs were skipped as already stored.
    #[must_use]
    pub fn skipped_processed(&self) -> usize {
        self.skipped_processed.load(Ordering::SeqCst)
    }

    /// Returns how many fetched records failed the eligibility check.
    #[must_use]
    pub fn skipped_ineligible(&self) -> usize {
        self.skipped_ineligible.load(Ordering::SeqCst)
    }

    /// Returns how many records could not be fetched or parsed.
    #[must_use]
    pub fn fetch_failed(&self) -> usize {
        self.fetch_failed.load(Ordering::SeqCst)
    }

    /// Returns how many eligible records were dropped after a failed image download.
    #[must_use]
    pub fn download_failed(&self) -> usize {
        self.download_failed.load(Ordering::SeqCst)
    }

    /// Returns how many records were stored.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Returns a point-in-time copy of every counter.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            attempted: self.attempted(),
            skipped_processed: self.skipped_processed(),
            skipped_ineligible: self.skipped_ineligible(),
            fetch_failed: self.fetch_failed(),
            download_failed: self.download_failed(),
            succeeded: self.succeeded(),
            interrupted: false,
        }
    }
}

/// Final counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// IDs taken from the list; the sum of the outcome counters.
    pub attempted: usize,
    /// IDs already stored, including repeats within the same list.
    pub skipped_processed: usize,
    /// Records fetched but not public domain or without an image.
    pub skipped_ineligible: usize,
    /// Records that could not be fetched or parsed.
    pub fetch_failed: usize,
    /// Eligible records dropped because the image download failed.
    pub download_failed: usize,
    /// Records appended to the store.
    pub succeeded: usize,
    /// The run stopped on request before the ID list was exhausted.
    pub interrupted: bool,
}

impl RunSummary {
    /// Returns the number of IDs that failed at fetch or download.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.fetch_failed + self.download_failed
    }
}
