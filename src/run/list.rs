//! Listing stored detections.

use anyhow::{Context, Result};

use crate::config::{Config, LogFormat};
use crate::initialization::init_store;
use crate::storage::DetectionRecord;

/// Reads every stored detection, oldest first.
pub async fn list_detections(config: &Config) -> Result<Vec<DetectionRecord>> {
    config.validate().context("Invalid configuration")?;
    let store = init_store(config)
        .await
        .context("Failed to open detection store")?;
    let records = store.list().await;
    store.close().await;
    records.context("Failed to read stored detections")
}

/// One output line for `record`: a JSON object, or the operator line layout
/// with the first-seen time in brackets.
pub fn format_record(record: &DetectionRecord, format: &LogFormat) -> Result<String> {
    match format {
        LogFormat::Json => serde_json::to_string(record).context("Failed to encode detection"),
        LogFormat::Plain => Ok(format!(
            "[{}] {} (SAN: {}) (Issuer: {}) (Fingerprint: {}) (StartTime: {})",
            record.first_seen,
            record.domain,
            record.san,
            record.issuer,
            record.fingerprint,
            record.start_time
        )),
    }
}
