//! Error handling and processing statistics.
//!
//! This module provides:
//! - The typed error taxonomy (fatal startup errors vs. per-event errors)
//! - Processing statistics tracking (failures and pipeline counters)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{ConfigError, DatabaseError, ErrorType, EventError, InfoType, InitializationError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::StoreInsertError);
        assert_eq!(stats.get_error_count(ErrorType::StoreInsertError), 1);
        assert_eq!(stats.get_error_count(ErrorType::StoreLookupError), 0);

        stats.increment_info(InfoType::FullDetection);
        stats.increment_info(InfoType::FullDetection);
        assert_eq!(stats.get_info_count(InfoType::FullDetection), 2);
    }

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::MalformedEvent);
        stats.increment_error(ErrorType::StoreUnavailable);
        stats.increment_info(InfoType::Heartbeat);
        assert_eq!(stats.total_errors(), 2);
    }

    #[test]
    fn test_processing_stats_concurrent_increments() {
        let stats = Arc::new(ProcessingStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.increment_info(InfoType::HostnameScanned);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.get_info_count(InfoType::HostnameScanned), 8000);
    }
}
