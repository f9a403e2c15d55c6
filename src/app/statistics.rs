//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Logs the one-line pipeline summary.
pub fn log_summary(stats: &ProcessingStats, elapsed_seconds: f64) {
    let events = stats.get_info_count(InfoType::EventReceived);
    let rate = if elapsed_seconds > 0.0 {
        events as f64 / elapsed_seconds
    } else {
        0.0
    };
    info!(
        "Handled {} events ({} hostnames, ~{:.1} events/sec): {} new detections, {} below threshold, {} errors",
        events,
        stats.get_info_count(InfoType::HostnameScanned),
        rate,
        stats.get_info_count(InfoType::FullDetection),
        stats.get_info_count(InfoType::PartialDetection),
        stats.total_errors()
    );
}

/// Prints every non-zero counter to the log.
pub fn print_statistics(stats: &ProcessingStats) {
    let total_errors = stats.total_errors();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    info!("Pipeline Counts:");
    for info_type in InfoType::iter() {
        let count = stats.get_info_count(info_type);
        if count > 0 {
            info!("   {}: {}", info_type.as_str(), count);
        }
    }
}
