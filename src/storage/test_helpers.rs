//! Shared test helpers for storage module tests.

#[cfg(test)]
use tempfile::TempDir;

#[cfg(test)]
use crate::storage::{DetectionRecord, DetectionStore};

/// Opens a store on a fresh temporary file.
///
/// The `TempDir` must be kept alive for as long as the store is used.
#[cfg(test)]
pub async fn create_test_store() -> (TempDir, DetectionStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = DetectionStore::open(&dir.path().join("ct_monitor_test.db"), "detections")
        .await
        .expect("Failed to open test store");
    (dir, store)
}

/// A detection record with fixed certificate fields.
#[cfg(test)]
pub fn sample_record(domain: &str) -> DetectionRecord {
    DetectionRecord {
        domain: domain.to_string(),
        san: String::new(),
        issuer: "C=US, O=Let's Encrypt, CN=R3".to_string(),
        fingerprint: "AB:CD:EF:01:23".to_string(),
        start_time: "2024-01-01T00:00:00".to_string(),
        first_seen: "2024-01-01T12:00:00".to_string(),
    }
}
