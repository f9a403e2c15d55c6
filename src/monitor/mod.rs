//! Event classification pipeline.
//!
//! `Monitor::handle` is the single entry point the feed calls per message. Each
//! hostname of a certificate update is scored on its own and, on a full
//! detection, recorded first-seen-only in the detection store. Nothing that goes
//! wrong for one hostname leaves `handle`: store failures are logged, counted
//! and the hostname is dropped.

use std::sync::Arc;

use chrono::Utc;
use log::{trace, warn};

use crate::detection::{Classification, DetectionConfig};
use crate::error_handling::{DatabaseError, ErrorType, InfoType, ProcessingStats};
use crate::feed::{format_timestamp, CertificateEvent, MessageType};
use crate::sink::{Detection, DetectionSink};
use crate::storage::{DetectionRecord, DetectionStore, InsertOutcome};


/// What happened to one hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOutcome {
    /// New detection: recorded and reported
    Detected,
    /// Full detection for a domain already in the store
    AlreadyKnown,
    /// Below threshold: diagnostic only
    Partial,
    /// Would have been a detection, but the blacklist matched
    Suppressed,
    NoMatch,
    /// Store failure; nothing recorded or reported
    Dropped,
}

/// The classification pipeline with its shared resources.
///
/// Cheap to share behind an `Arc`; `handle` may run on many tasks at once.
pub struct Monitor {
    detection: Arc<DetectionConfig>,
    store: Arc<DetectionStore>,
    sink: Arc<dyn DetectionSink>,
    stats: Arc<ProcessingStats>,
}

impl Monitor {
    pub fn new(
        detection: Arc<DetectionConfig>,
        store: Arc<DetectionStore>,
        sink: Arc<dyn DetectionSink>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Monitor {
            detection,
            store,
            sink,
            stats,
        }
    }

    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    pub fn store(&self) -> &Arc<DetectionStore> {
        &self.store
    }

    /// Handles one feed message.
    ///
    /// Heartbeats and other non-certificate messages return immediately with no
    /// outcomes. Otherwise returns one outcome per hostname, in feed order.
    pub async fn handle(&self, event: &CertificateEvent) -> Vec<HostOutcome> {
        self.stats.increment_info(InfoType::EventReceived);

        match &event.message_type {
            MessageType::CertificateUpdate => {}
            MessageType::Heartbeat => {
                self.stats.increment_info(InfoType::Heartbeat);
                return Vec::new();
            }
            MessageType::Other(kind) => {
                trace!("Ignoring feed message of type {:?}", kind);
                self.stats.increment_info(InfoType::UnknownMessageType);
                return Vec::new();
            }
        }

        let mut outcomes = Vec::with_capacity(event.all_domains.len());
        for hostname in &event.all_domains {
            outcomes.push(self.handle_hostname(hostname, event).await);
        }
        outcomes
    }

    async fn handle_hostname(&self, hostname: &str, event: &CertificateEvent) -> HostOutcome {
        self.stats.increment_info(InfoType::HostnameScanned);
        let score = self.detection.score(hostname);

        match score.classification {
            Classification::FullDetection => {
                self.record_detection(hostname, event, score.find_count)
                    .await
            }
            Classification::PartialDetection => {
                self.stats.increment_info(InfoType::PartialDetection);
                self.sink
                    .report_partial(&Detection::new(hostname, event, score.find_count));
                HostOutcome::Partial
            }
            Classification::NoMatch if score.blacklisted && score.find_count > 0 => {
                self.stats.increment_info(InfoType::BlacklistSuppressed);
                HostOutcome::Suppressed
            }
            Classification::NoMatch => HostOutcome::NoMatch,
        }
    }

    async fn record_detection(
        &self,
        hostname: &str,
        event: &CertificateEvent,
        find_count: usize,
    ) -> HostOutcome {
        // Cheap pre-check; the insert below is what guarantees uniqueness.
        match self.store.exists(hostname).await {
            Ok(true) => {
                self.stats.increment_info(InfoType::DuplicateDetection);
                return HostOutcome::AlreadyKnown;
            }
            Ok(false) => {}
            Err(e) => {
                self.store_failure(ErrorType::StoreLookupError, hostname, &e);
                return HostOutcome::Dropped;
            }
        }

        let record = DetectionRecord {
            domain: hostname.to_string(),
            san: String::new(),
            issuer: event.issuer_aggregated.clone(),
            fingerprint: event.fingerprint.clone(),
            start_time: event.start_time(),
            first_seen: format_timestamp(Utc::now()),
        };

        match self.store.insert(&record).await {
            Ok(InsertOutcome::Inserted) => {
                self.stats.increment_info(InfoType::FullDetection);
                self.sink
                    .report_detection(&Detection::new(hostname, event, find_count));
                HostOutcome::Detected
            }
            Ok(InsertOutcome::AlreadyPresent) => {
                self.stats.increment_info(InfoType::DuplicateDetection);
                HostOutcome::AlreadyKnown
            }
            Err(e) => {
                self.store_failure(ErrorType::StoreInsertError, hostname, &e);
                HostOutcome::Dropped
            }
        }
    }

    fn store_failure(&self, kind: ErrorType, hostname: &str, error: &DatabaseError) {
        match error {
            DatabaseError::CircuitOpen => {
                self.stats.increment_error(ErrorType::StoreUnavailable);
                trace!("Store unavailable, dropping detection for {}", hostname);
            }
            _ => {
                self.stats.increment_error(kind);
                warn!(
                    "{} for {}, dropping detection: {}",
                    kind.as_str(),
                    hostname,
                    error
                );
            }
        }
    }
}
