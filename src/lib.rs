//! ct_monitor library: certificate transparency keyword monitoring
//!
//! Consumes a certstream feed of newly issued certificates, scores every SAN
//! hostname against a keyword pattern, and records each hostname that reaches
//! the detection threshold exactly once in a SQLite store. New detections are
//! reported as operator lines; below-threshold matches go to the diagnostic log.
//!
//! # Example
//!
//! ```no_run
//! use ct_monitor::{run_monitor, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input: std::path::PathBuf::from("certstream.jsonl"),
//!     search_pattern: "paypal|login|verify".to_string(),
//!     detection_threshold: 2,
//!     ..Default::default()
//! };
//!
//! let report = run_monitor(config, CancellationToken::new()).await?;
//! println!("Handled {} events: {} new detections",
//!          report.events, report.new_detections);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod config;
pub mod detection;
pub mod error_handling;
pub mod feed;
pub mod initialization;
pub mod monitor;
mod run;
pub mod sink;
pub mod storage;

// Re-export public API
pub use app::spawn_signal_listener;
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use detection::{Classification, DetectionConfig};
pub use feed::{feed_from_reader, CertificateEvent, FeedInput, OverflowPolicy};
pub use monitor::{HostOutcome, Monitor};
pub use run::{
    consume_feed, format_record, list_detections, run_monitor, run_monitor_with, MonitorReport,
};
pub use sink::{ConsoleSink, Detection, DetectionSink, MemorySink};
pub use storage::{DetectionRecord, DetectionStore, InsertOutcome};
