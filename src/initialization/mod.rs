//! Application initialization.
//!
//! Logger setup and the shared resources a run needs: the compiled detection
//! settings, the detection store and the statistics tracker.

mod logger;

use std::sync::Arc;

use crate::config::Config;
use crate::error_handling::{DatabaseError, ProcessingStats};
use crate::storage::DetectionStore;

// Re-export public API
pub use logger::{init_logger_to_file, init_logger_with};

/// Initializes the logger from the configuration: to `log_file` when set,
/// stderr otherwise.
pub fn init_logger(config: &Config) -> Result<(), crate::error_handling::InitializationError> {
    let level = config.log_level.clone().into();
    match &config.log_file {
        Some(path) => init_logger_to_file(level, config.log_format.clone(), path),
        None => init_logger_with(level, config.log_format.clone()),
    }
}

/// Opens the detection store named by the configuration.
pub async fn init_store(config: &Config) -> Result<Arc<DetectionStore>, DatabaseError> {
    let store = DetectionStore::open(&config.db_path, &config.table_name).await?;
    Ok(Arc::new(store))
}

/// Creates the statistics tracker shared by every handler task.
pub fn init_stats() -> Arc<ProcessingStats> {
    Arc::new(ProcessingStats::new())
}
