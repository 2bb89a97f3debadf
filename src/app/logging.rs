//! Progress logging utilities.

use std::sync::Arc;
use std::time::Instant;

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::LOGGING_INTERVAL;
use crate::error_handling::ProcessingStats;

/// Logs how many messages have been received and stored so far.
pub fn log_progress(start_time: Instant, stats: &ProcessingStats) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let received = stats.received();
    let rate = if elapsed_secs > 0.0 {
        received as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Received {} messages, stored {}, skipped {} in {:.2} seconds (~{:.2} msgs/sec)",
        received,
        stats.stored(),
        stats.total_skipped(),
        elapsed_secs,
        rate
    );
}

/// Spawns a task that calls [`log_progress`] every [`LOGGING_INTERVAL`] until
/// `cancel` fires.
pub fn spawn_progress_logger(
    start_time: Instant,
    stats: Arc<ProcessingStats>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LOGGING_INTERVAL);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => log_progress(start_time, &stats),
            }
        }
    })
}
