// Shared test helpers for feed replay and store setup.
//
// Each test file that needs these declares `mod helpers;`.

use std::path::Path;
use std::sync::Arc;

use ct_monitor::{feed_from_reader, Config, FeedInput, MemorySink, OverflowPolicy};

/// A config for a temporary database with pattern `paypal|login` and threshold 2.
#[allow(dead_code)] // Used by other test files
pub fn test_config(db_path: &Path) -> Config {
    Config {
        db_path: db_path.to_path_buf(),
        search_pattern: "paypal|login".to_string(),
        detection_threshold: 2,
        stats_interval_secs: 0,
        ..Default::default()
    }
}

/// A certstream `certificate_update` message as one JSON line.
#[allow(dead_code)]
pub fn certificate_update(domains: &[&str], issuer: &str, fingerprint: &str) -> String {
    serde_json::json!({
        "message_type": "certificate_update",
        "data": {
            "update_type": "X509LogEntry",
            "leaf_cert": {
                "subject": { "aggregated": format!("/CN={}", domains.first().unwrap_or(&"")) },
                "issuer": { "aggregated": issuer },
                "all_domains": domains,
                "fingerprint": fingerprint,
                "not_before": 1700000000,
                "not_after": 1707776000
            },
            "seen": 1700000100.25
        }
    })
    .to_string()
}

#[allow(dead_code)]
pub fn heartbeat() -> String {
    r#"{"message_type": "heartbeat", "timestamp": 1700000000.0}"#.to_string()
}

/// An in-memory feed made of `lines`.
#[allow(dead_code)]
pub fn feed(lines: &[String], overflow: OverflowPolicy) -> FeedInput {
    let text = lines.join("\n");
    feed_from_reader(std::io::Cursor::new(text.into_bytes()), overflow)
}

#[allow(dead_code)]
pub fn memory_sink() -> Arc<MemorySink> {
    Arc::new(MemorySink::new())
}
