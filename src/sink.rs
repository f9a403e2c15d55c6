//! Detection output.
//!
//! Full detections go to the operator-visible stream (stdout by default), one
//! line each, flushed as soon as it is written. Below-threshold matches only go
//! to the diagnostic log (`debug` level, `ct_monitor::diagnostic` target).

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use log::{debug, warn};

use crate::config::DIAGNOSTIC_TARGET;
use crate::feed::CertificateEvent;

/// What is reported about one hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Local wall-clock time of the report
    pub timestamp: String,
    pub hostname: String,
    pub issuer: String,
    pub fingerprint: String,
    /// Certificate `notBefore`
    pub start_time: String,
    pub find_count: usize,
}

impl Detection {
    pub fn new(hostname: &str, event: &CertificateEvent, find_count: usize) -> Self {
        Detection {
            timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            hostname: hostname.to_string(),
            issuer: event.issuer_aggregated.clone(),
            fingerprint: event.fingerprint.clone(),
            start_time: event.start_time(),
            find_count,
        }
    }

    /// The operator line: `[time] host (SAN: ) (Issuer: ..) (Fingerprint: ..) (StartTime: ..)`.
    pub fn operator_line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.details())
    }

    /// The diagnostic line for a below-threshold match.
    pub fn diagnostic_line(&self) -> String {
        format!("DETECTION THRESHOLD VALUE NOT REACHED - {}", self.details())
    }

    fn details(&self) -> String {
        format!(
            "{} (SAN: ) (Issuer: {}) (Fingerprint: {}) (StartTime: {})",
            self.hostname, self.issuer, self.fingerprint, self.start_time
        )
    }
}

/// Where detections are reported. Implementations must be callable from many
/// handler tasks at once.
pub trait DetectionSink: Send + Sync {
    /// A newly recorded detection.
    fn report_detection(&self, detection: &Detection);

    /// A match below the threshold. Never shown on the operator channel.
    fn report_partial(&self, detection: &Detection);
}

/// Writes detections to a stream and partial matches to the diagnostic log.
pub struct ConsoleSink<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink {
            out: Mutex::new(out),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> DetectionSink for ConsoleSink<W> {
    fn report_detection(&self, detection: &Detection) {
        let mut out = self.lock();
        let result = writeln!(out, "{}", detection.operator_line()).and_then(|_| out.flush());
        if let Err(e) = result {
            warn!(
                "Failed to write detection for {}: {}",
                detection.hostname, e
            );
        }
    }

    fn report_partial(&self, detection: &Detection) {
        debug!(target: DIAGNOSTIC_TARGET, "{}", detection.diagnostic_line());
    }
}

/// Keeps every report in memory. Useful in tests and when embedding the monitor.
#[derive(Default)]
pub struct MemorySink {
    detections: Mutex<Vec<Detection>>,
    partials: Mutex<Vec<Detection>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detections(&self) -> Vec<Detection> {
        self.detections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn partials(&self) -> Vec<Detection> {
        self.partials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DetectionSink for MemorySink {
    fn report_detection(&self, detection: &Detection) {
        self.detections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(detection.clone());
    }

    fn report_partial(&self, detection: &Detection) {
        self.partials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(detection.clone());
    }
}
