//! Build the catalog client, asset downloader, and store, then drive the pipeline.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use harvester_core::{
    AssetDownloader, AssetSink, CatalogClient, LoadStatus, Pipeline, PipelineOptions, RateLimiter,
    ResumableStore, RunSummary, load_record_ids,
};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::config_manager::RunSettings;
use crate::app::{exit_handler, progress_manager, terminal};

/// Runs one harvest with resolved settings.
///
/// The ID list is read before the store is touched, so a malformed list
/// leaves the output file as it was.
pub(crate) async fn run_harvest(settings: &RunSettings, quiet: bool) -> Result<ProcessExit> {
    let ids = load_record_ids(&settings.input)?;
    info!(count = ids.len(), input = %settings.input.display(), "Loaded record IDs");

    let (store, status) =
        ResumableStore::load(&settings.output, settings.checkpoint_interval).await;
    if let LoadStatus::Corrupt { reason } = &status {
        warn!(
            output = %settings.output.display(),
            %reason,
            "Existing metadata could not be used; starting from an empty collection"
        );
    }
    let store = Arc::new(store);

    let processed = store.processed_ids().await;
    let remaining = ids.iter().filter(|id| !processed.contains(id)).count();
    info!(
        total = ids.len(),
        already_stored = ids.len() - remaining,
        remaining,
        "Resume state"
    );

    let source = Arc::new(
        CatalogClient::with_timeout(&settings.base_url, settings.fetch_timeout)
            .context("Invalid catalog base URL")?,
    );

    let assets: Option<Arc<dyn AssetSink>> = if settings.download_images {
        Some(Arc::new(AssetDownloader::with_timeout(
            settings.images_dir.clone(),
            settings.download_timeout,
        )))
    } else {
        info!("Image downloads disabled; storing metadata only");
        None
    };

    let rate_limiter = if settings.rate_limit.is_zero() {
        debug!("rate limiting disabled");
        Arc::new(RateLimiter::disabled())
    } else {
        debug!(rate_limit_ms = settings.rate_limit.as_millis(), "rate limiting enabled");
        Arc::new(RateLimiter::new(settings.rate_limit))
    };

    let pipeline = Pipeline::new(
        source,
        assets,
        Arc::clone(&store),
        rate_limiter,
        PipelineOptions {
            concurrency: settings.concurrency,
            progress_interval: settings.progress_interval,
        },
    )?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, &interrupted_signal).await {
            warn!("Second interrupt received; exiting without the final save");
            std::process::exit(i32::from(ProcessExit::Interrupted.code()));
        }
    });

    let use_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        quiet,
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_bar, pipeline.stats(), ids.len());

    let result = pipeline.run(&ids, &interrupted).await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let summary = result.with_context(|| {
        format!(
            "Harvest aborted: could not write metadata to '{}'",
            settings.output.display()
        )
    })?;

    if !quiet {
        println!("{}", format_summary(&summary, store.len().await));
    }

    if summary.interrupted {
        warn!(
            attempted = summary.attempted,
            total = ids.len(),
            "Interrupted. Run again to resume."
        );
    }

    Ok(exit_handler::determine_exit_outcome(&summary))
}

/// Sets `interrupted` on the first signal and waits for a second one.
///
/// Returns `true` when a second signal arrived and the process should exit
/// at once; `false` if listening for signals failed.
async fn watch_interrupts<F, Fut>(mut next_signal: F, interrupted: &AtomicBool) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    interrupted.store(true, Ordering::SeqCst);
    warn!("Interrupt received; stopping after in-flight records finish. Press Ctrl-C again to exit now");
    next_signal().await.is_ok()
}

fn format_summary(summary: &RunSummary, stored: usize) -> String {
    let mut text = format!(
        "Attempted {}: {} stored, {} already stored, {} ineligible, {} failed ({} fetch, {} download)",
        summary.attempted,
        summary.succeeded,
        summary.skipped_processed,
        summary.skipped_ineligible,
        summary.failed(),
        summary.fetch_failed,
        summary.download_failed,
    );
    text.push_str(&format!("\nMetadata file holds {stored} records"));
    if summary.interrupted {
        text.push_str("\nInterrupted before the end of the ID list; run again to resume");
    }
    text
}
