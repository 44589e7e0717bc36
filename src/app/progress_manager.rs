//! Progress bar for harvest runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use harvester_core::RunStats;
use indicatif::{ProgressBar, ProgressStyle};

/// Spawns the progress UI when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_bar` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_bar: bool,
    stats: Arc<RunStats>,
    total: usize,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_bar {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_bar_inner(stats, total, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_bar_inner(
    stats: Arc<RunStats>,
    total: usize,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .map(|style| style.progress_chars("=> "))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            bar.set_position(u64::try_from(stats.attempted()).unwrap_or(u64::MAX));
            bar.set_message(progress_message(&stats));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        bar.finish_and_clear();
    })
}

fn progress_message(stats: &RunStats) -> String {
    let failed = stats.fetch_failed() + stats.download_failed();
    let skipped = stats.skipped_processed() + stats.skipped_ineligible();
    format!(
        "stored {} | skipped {skipped} | failed {failed}",
        stats.succeeded()
    )
}
