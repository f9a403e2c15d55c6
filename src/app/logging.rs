//! Periodic progress logging.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::app::statistics::log_summary;
use crate::error_handling::ProcessingStats;

/// Spawns a task that logs the pipeline summary every `interval` until `cancel`
/// fires. Returns `None` when `interval` is zero.
pub fn spawn_progress_logger(
    stats: Arc<ProcessingStats>,
    start_time: Instant,
    interval: Duration,
    cancel: CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    log_summary(&stats, start_time.elapsed().as_secs_f64());
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    }))
}
