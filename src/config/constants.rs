//! Configuration constants.
//!
//! Defaults and operational limits shared by the CLI and the library.

use std::time::Duration;

/// Default SQLite store location.
pub const DB_PATH: &str = "./ct_monitor.db";

/// Default name of the detection table.
pub const DEFAULT_TABLE_NAME: &str = "detections";

/// Default minimum number of distinct keyword hits for a full detection.
pub const DEFAULT_DETECTION_THRESHOLD: i64 = 2;

/// Default CT log aggregator the feed collaborator connects to.
pub const DEFAULT_FEED_URL: &str = "wss://certstream.calidog.io";

/// Reads the feed from stdin when passed as the input path.
pub const STDIN_INPUT: &str = "-";

/// Default number of events handled concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Upper bound on `max_concurrency`. SQLite serialises writers, so more
/// in-flight events than this only queue on the pool.
pub const MAX_CONCURRENCY_LIMIT: usize = 256;

/// Default interval between statistics log lines, in seconds.
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 60;

// Store
/// Maximum pooled SQLite connections
pub const DB_MAX_CONNECTIONS: u32 = 8;
/// How long an event waits for a pooled connection before it is dropped
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
/// SQLite busy timeout for lock contention between writers
pub const DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// Write circuit breaker
/// Consecutive store failures before the breaker opens
pub const STORE_FAILURE_THRESHOLD: u32 = 5;
/// How long store access is skipped once the breaker is open
pub const STORE_COOLDOWN: Duration = Duration::from_secs(30);

/// `log` target for partial (sub-threshold) detections.
pub const DIAGNOSTIC_TARGET: &str = "ct_monitor::diagnostic";
