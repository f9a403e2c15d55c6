// storage/mod.rs
// Detection store: SQLite pool, detection table, write circuit breaker

pub mod circuit_breaker;
pub mod detections;
pub mod models;
pub mod pool;
#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used items
pub use circuit_breaker::StoreCircuitBreaker;
pub use detections::DetectionStore;
pub use models::{DetectionRecord, InsertOutcome};
pub use pool::init_db_pool_with_path;
