//! Dispatch loop and per-ID processing.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::stats::{RecordOutcome, RunStats, RunSummary};
use crate::catalog::{RecordId, RecordSource, check_eligibility, project};
use crate::download::{AssetSink, RateLimiter};
use crate::store::{ResumableStore, StoreError};

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 32;

/// Default concurrency: one ID at a time, in list order.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default number of IDs between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 25;

/// Error type for pipeline runs.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Writing the metadata store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Tuning knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Number of IDs processed at once (1-32).
    pub concurrency: usize,
    /// Number of IDs between progress log lines. Zero is treated as one.
    pub progress_interval: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Everything a worker task needs to process one ID.
#[derive(Clone)]
struct Stage {
    source: Arc<dyn RecordSource>,
    assets: Option<Arc<dyn AssetSink>>,
    store: Arc<ResumableStore>,
    rate_limiter: Arc<RateLimiter>,
    stats: Arc<RunStats>,
    progress_interval: usize,
}

/// Drives record IDs through fetch, filter, download, and storage.
///
/// # Concurrency Model
///
/// - Each ID runs in its own Tokio task
/// - A semaphore permit is acquired before dispatching each ID, so with the
///   default concurrency of one the IDs run strictly in list order
/// - The rate limiter and the store are shared, so pacing is aggregate and
///   appends never interleave with a flush
/// - The stop flag is checked between IDs; in-flight IDs always finish
///
/// Image downloads happen only when an [`AssetSink`] is supplied.
pub struct Pipeline {
    stage: Stage,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("concurrency", &self.concurrency)
            .field("downloads", &self.stage.assets.is_some())
            .field("store", &self.stage.store.path())
            .field("rate_limiter", &self.stage.rate_limiter)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline over the given components.
    ///
    /// Pass `None` for `assets` to store metadata without downloading images.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConcurrency`] if `options.concurrency`
    /// is outside 1-32.
    pub fn new(
        source: Arc<dyn RecordSource>,
        assets: Option<Arc<dyn AssetSink>>,
        store: Arc<ResumableStore>,
        rate_limiter: Arc<RateLimiter>,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError> {
        let concurrency = options.concurrency;
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(PipelineError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            downloads = assets.is_some(),
            rate_limit_ms = rate_limiter.delay().as_millis(),
            rate_limit_disabled = rate_limiter.is_disabled(),
            checkpoint_interval = store.checkpoint_interval(),
            "creating pipeline"
        );

        Ok(Self {
            stage: Stage {
                source,
                assets,
                store,
                rate_limiter,
                stats: Arc::new(RunStats::new()),
                progress_interval: options.progress_interval.max(1),
            },
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the live counters, for progress reporting during [`run`](Self::run).
    #[must_use]
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stage.stats)
    }

    /// Processes `ids` in order and returns the final counters.
    ///
    /// The store is flushed once more after the last ID, after a stop
    /// request, and after a fatal store error, so every record accepted in
    /// memory gets a last chance to reach disk.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if a checkpoint or the final flush
    /// fails. Per-ID fetch and download failures are counted, not returned.
    #[instrument(skip(self, ids, stop), fields(total = ids.len(), concurrency = self.concurrency))]
    pub async fn run(&self, ids: &[RecordId], stop: &AtomicBool) -> Result<RunSummary, PipelineError> {
        info!(downloads = self.stage.assets.is_some(), "starting harvest");

        let abort = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        let mut fatal: Option<StoreError> = None;

        let dispatched = self
            .dispatch(ids, stop, &abort, &mut tasks, &mut fatal)
            .await;

        debug!(in_flight = tasks.len(), "waiting for in-flight records");
        while let Some(joined) = tasks.join_next().await {
            keep_first_error(joined, &mut fatal);
        }

        let flushed = self.stage.store.flush().await;

        let mut summary = self.stage.stats.summary();
        summary.interrupted = matches!(dispatched, Ok(true));
        let stored = self.stage.store.len().await;
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            skipped_processed = summary.skipped_processed,
            skipped_ineligible = summary.skipped_ineligible,
            fetch_failed = summary.fetch_failed,
            download_failed = summary.download_failed,
            interrupted = summary.interrupted,
            stored,
            "harvest finished"
        );

        dispatched?;
        if let Some(error) = fatal {
            if let Err(flush_error) = flushed {
                warn!(error = %flush_error, "final flush also failed");
            }
            return Err(error.into());
        }
        flushed?;
        Ok(summary)
    }

    /// Spawns one task per ID until the list ends, a stop is requested, or a
    /// task reports a store failure. Returns whether the run was interrupted.
    async fn dispatch(
        &self,
        ids: &[RecordId],
        stop: &AtomicBool,
        abort: &Arc<AtomicBool>,
        tasks: &mut JoinSet<Result<(), StoreError>>,
        fatal: &mut Option<StoreError>,
    ) -> Result<bool, PipelineError> {
        for (index, &id) in ids.iter().enumerate() {
            if stop.load(Ordering::SeqCst) {
                info!(remaining = ids.len() - index, "stop requested, not starting further ids");
                return Ok(true);
            }

            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| PipelineError::SemaphoreClosed)?;

            while let Some(joined) = tasks.try_join_next() {
                keep_first_error(joined, fatal);
            }
            if abort.load(Ordering::SeqCst) {
                warn!("store write failed, not starting further ids");
                return Ok(false);
            }
            if stop.load(Ordering::SeqCst) {
                info!(remaining = ids.len() - index, "stop requested, not starting further ids");
                return Ok(true);
            }

            let stage = self.stage.clone();
            let abort = Arc::clone(abort);
            tasks.spawn(async move {
                // Permit is dropped when this block exits
                let _permit = permit;
                let result = stage.process(id).await;
                if result.is_err() {
                    abort.store(true, Ordering::SeqCst);
                }
                result
            });
        }
        Ok(false)
    }
}

/// Keeps the first store error a finished task returned.
fn keep_first_error(
    joined: Result<Result<(), StoreError>, JoinError>,
    fatal: &mut Option<StoreError>,
) {
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            warn!(error = %error, "store write failed");
            if fatal.is_none() {
                *fatal = Some(error);
            }
        }
        Err(e) => warn!(error = %e, "record task panicked"),
    }
}

impl Stage {
    async fn process(&self, id: RecordId) -> Result<(), StoreError> {
        let outcome = self.process_one(id).await?;
        let attempted = self.stats.record(outcome);
        if attempted % self.progress_interval == 0 {
            info!(
                attempted,
                succeeded = self.stats.succeeded(),
                skipped_processed = self.stats.skipped_processed(),
                skipped_ineligible = self.stats.skipped_ineligible(),
                fetch_failed = self.stats.fetch_failed(),
                download_failed = self.stats.download_failed(),
                "progress"
            );
        }
        Ok(())
    }

    /// Runs one ID to its terminal outcome.
    ///
    /// The ID is claimed in the store first, so a repeated ID is skipped
    /// without a network call even while its first occurrence is in flight.
    /// Only a failed checkpoint escapes as an error; every other failure is
    /// an outcome.
    #[instrument(level = "debug", skip(self))]
    async fn process_one(&self, id: RecordId) -> Result<RecordOutcome, StoreError> {
        if !self.store.try_claim(id).await {
            debug!(id, "already processed or in flight, skipping");
            return Ok(RecordOutcome::SkippedProcessed);
        }

        let outcome = self.process_claimed(id).await;
        if !matches!(outcome, Ok(RecordOutcome::Succeeded)) {
            self.store.release(id).await;
        }
        outcome
    }

    async fn process_claimed(&self, id: RecordId) -> Result<RecordOutcome, StoreError> {
        self.rate_limiter.acquire().await;

        let raw = match self.source.fetch(id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(id, error = %e, "failed to fetch record");
                return Ok(RecordOutcome::FetchFailed);
            }
        };

        if let Err(reason) = check_eligibility(&raw) {
            info!(id, %reason, "skipping ineligible record");
            return Ok(RecordOutcome::SkippedIneligible(reason));
        }

        let local_image = match &self.assets {
            Some(assets) => {
                let url = raw.primary_image.as_deref().unwrap_or_default();
                match assets.download(url, id).await {
                    Ok(name) => Some(name),
                    Err(e) => {
                        warn!(id, error = %e, "image download failed, record not stored");
                        return Ok(RecordOutcome::DownloadFailed);
                    }
                }
            }
            None => None,
        };

        let record = project(id, &raw, local_image.as_deref());
        let title = record.title.clone();
        if !self.store.append_and_checkpoint(record).await? {
            debug!(id, "record stored concurrently by another task");
            return Ok(RecordOutcome::SkippedProcessed);
        }

        info!(id, %title, image = ?local_image, "stored record");
        Ok(RecordOutcome::Succeeded)
    }
}
