// storage/models.rs
// Persistent record types

use serde::Serialize;

/// One first-seen detection. At most one exists per `domain`, and it is never
/// updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionRecord {
    /// Detected hostname (unique key)
    pub domain: String,
    /// Reserved, always stored empty
    pub san: String,
    /// Issuer summary of the certificate that triggered the detection
    pub issuer: String,
    /// Certificate fingerprint
    pub fingerprint: String,
    /// Certificate `notBefore`, ISO-8601 UTC without offset
    pub start_time: String,
    /// Detection wall-clock time, ISO-8601 UTC without offset
    pub first_seen: String,
}

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written.
    Inserted,
    /// A record for the domain already existed; nothing was written.
    AlreadyPresent,
}
