//! Run orchestration: wires configuration, store, sink and feed together and
//! drives the feed to completion.

mod dispatch;
mod list;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::app::{log_summary, print_statistics, shutdown_gracefully, spawn_progress_logger};
use crate::config::Config;
use crate::error_handling::{InfoType, ProcessingStats};
use crate::feed::{log_endpoint, open_input, FeedInput};
use crate::initialization::{init_stats, init_store};
use crate::monitor::Monitor;
use crate::sink::{ConsoleSink, DetectionSink};

pub use dispatch::consume_feed;
pub use list::{format_record, list_detections};

/// Results of a monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    /// Feed messages handled, heartbeats included
    pub events: usize,
    /// Hostnames scored
    pub hostnames: usize,
    /// Detections recorded and reported during this run
    pub new_detections: usize,
    /// Below-threshold matches
    pub partial_detections: usize,
    /// Malformed, dropped or failed events
    pub errors: usize,
    /// Rows in the detection table when the run ended
    pub stored_detections: i64,
    /// Path to the SQLite database holding detections
    pub db_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Monitors the feed named by `config.input`, reporting detections on stdout.
///
/// Runs until the input ends or `cancel` fires.
///
/// # Errors
///
/// Fails before reading anything if the configuration is invalid, the store
/// cannot be opened or the input cannot be opened. Fails afterwards only on an
/// unrecoverable read error.
///
/// # Example
///
/// ```no_run
/// use ct_monitor::{run_monitor, Config};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     input: "certstream.jsonl".into(),
///     search_pattern: "paypal|login".to_string(),
///     ..Default::default()
/// };
/// let report = run_monitor(config, CancellationToken::new()).await?;
/// println!("{} new detections", report.new_detections);
/// # Ok(())
/// # }
/// ```
pub async fn run_monitor(config: Config, cancel: CancellationToken) -> Result<MonitorReport> {
    config.validate().context("Invalid configuration")?;
    let input = open_input(&config.input)
        .await
        .with_context(|| format!("Failed to open feed input {}", config.input.display()))?;
    let sink: Arc<dyn DetectionSink> = Arc::new(ConsoleSink::stdout());
    run_monitor_with(config, input, sink, cancel).await
}

/// Same as [`run_monitor`] with a caller-supplied feed and sink.
pub async fn run_monitor_with(
    config: Config,
    input: FeedInput,
    sink: Arc<dyn DetectionSink>,
    cancel: CancellationToken,
) -> Result<MonitorReport> {
    config.validate().context("Invalid configuration")?;
    let detection = Arc::new(config.detection().context("Invalid configuration")?);

    let store = init_store(&config)
        .await
        .context("Failed to open detection store")?;
    let stats = init_stats();

    log_endpoint(&config.feed, &input.origin);
    info!(
        "Looking for these strings: {}, detection threshold: {}",
        detection.search().as_str(),
        detection.threshold()
    );
    if detection.blacklist().is_configured() {
        info!("Blacklist: {}", detection.blacklist().as_str());
    }

    let monitor = Arc::new(Monitor::new(
        detection,
        Arc::clone(&store),
        sink,
        Arc::clone(&stats),
    ));

    let start_time = Instant::now();
    let cancel_logging = cancel.child_token();
    let logging_task = spawn_progress_logger(
        Arc::clone(&stats),
        start_time,
        Duration::from_secs(config.stats_interval_secs),
        cancel_logging.clone(),
    );

    let consumed = consume_feed(input, monitor, config.max_concurrency, cancel).await;

    shutdown_gracefully(cancel_logging, logging_task).await;

    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    print_statistics(&stats);
    log_summary(&stats, elapsed_seconds);

    let stored_detections = store.count().await.unwrap_or_else(|e| {
        log::warn!("Failed to count stored detections: {}", e);
        -1
    });
    store.close().await;

    consumed.context("Failed to read feed input")?;

    Ok(report(&stats, stored_detections, config.db_path, elapsed_seconds))
}

fn report(
    stats: &ProcessingStats,
    stored_detections: i64,
    db_path: PathBuf,
    elapsed_seconds: f64,
) -> MonitorReport {
    MonitorReport {
        events: stats.get_info_count(InfoType::EventReceived),
        hostnames: stats.get_info_count(InfoType::HostnameScanned),
        new_detections: stats.get_info_count(InfoType::FullDetection),
        partial_detections: stats.get_info_count(InfoType::PartialDetection),
        errors: stats.total_errors(),
        stored_detections,
        db_path,
        elapsed_seconds,
    }
}
