//! Certstream message decoding.
//!
//! Messages are read field by field from a `serde_json::Value` instead of a
//! derived struct: a certificate update with an unexpected shape still yields
//! an event, with missing parts left empty, rather than failing as a whole.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error_handling::EventError;

/// Upstream message kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    Heartbeat,
    CertificateUpdate,
    /// Anything else, with the raw `message_type` (empty when absent).
    Other(String),
}

impl MessageType {
    fn parse(raw: &str) -> Self {
        match raw {
            "heartbeat" => MessageType::Heartbeat,
            "certificate_update" => MessageType::CertificateUpdate,
            other => MessageType::Other(other.to_string()),
        }
    }
}

/// One decoded feed message. Lives only while it is being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateEvent {
    pub message_type: MessageType,
    /// Leaf certificate SAN hostnames, in feed order
    pub all_domains: Vec<String>,
    pub subject_aggregated: String,
    pub issuer_aggregated: String,
    pub fingerprint: String,
    pub not_before: Option<DateTime<Utc>>,
}

impl CertificateEvent {
    /// A heartbeat message.
    pub fn heartbeat() -> Self {
        CertificateEvent {
            message_type: MessageType::Heartbeat,
            all_domains: Vec::new(),
            subject_aggregated: String::new(),
            issuer_aggregated: String::new(),
            fingerprint: String::new(),
            not_before: None,
        }
    }

    /// A certificate update for `domains`.
    pub fn certificate_update<I, S>(
        domains: I,
        issuer: &str,
        fingerprint: &str,
        not_before: Option<DateTime<Utc>>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CertificateEvent {
            message_type: MessageType::CertificateUpdate,
            all_domains: domains.into_iter().map(Into::into).collect(),
            subject_aggregated: String::new(),
            issuer_aggregated: issuer.to_string(),
            fingerprint: fingerprint.to_string(),
            not_before,
        }
    }

    /// Decodes one certstream JSON message.
    ///
    /// # Errors
    ///
    /// Fails only when the text is not JSON or not a JSON object. Missing or
    /// mistyped fields become empty values.
    pub fn from_json(text: &str) -> Result<Self, EventError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, EventError> {
        if !value.is_object() {
            return Err(EventError::NotAnObject);
        }

        let message_type = MessageType::parse(value["message_type"].as_str().unwrap_or(""));
        let leaf = &value["data"]["leaf_cert"];

        let all_domains = match message_type {
            MessageType::CertificateUpdate => leaf["all_domains"]
                .as_array()
                .map(|domains| {
                    domains
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        Ok(CertificateEvent {
            message_type,
            all_domains,
            subject_aggregated: string_field(&leaf["subject"]["aggregated"]),
            issuer_aggregated: string_field(&leaf["issuer"]["aggregated"]),
            fingerprint: string_field(&leaf["fingerprint"]),
            not_before: timestamp_field(&leaf["not_before"]),
        })
    }

    /// `not_before` as ISO-8601, or empty when unknown.
    ///
    /// Microseconds are appended only when the feed gave a fractional time.
    pub fn start_time(&self) -> String {
        self.not_before
            .map(|instant| {
                if instant.timestamp_subsec_micros() == 0 {
                    format_timestamp(instant)
                } else {
                    instant.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
                }
            })
            .unwrap_or_default()
    }
}

fn string_field(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// Unix seconds, integer or float. Fractions are kept to the microsecond.
fn timestamp_field(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(seconds) = value.as_i64() {
        return DateTime::from_timestamp(seconds, 0);
    }
    let raw = value.as_f64().filter(|f| f.is_finite())?;
    let micros = (raw * 1_000_000.0).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// Formats a UTC instant as `YYYY-MM-DDTHH:MM:SS` (no offset, no fraction).
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_UPDATE: &str = r#"{
        "message_type": "certificate_update",
        "data": {
            "update_type": "X509LogEntry",
            "leaf_cert": {
                "subject": {"aggregated": "/CN=secure-paypal-login.com"},
                "issuer": {"aggregated": "/C=US/O=Let's Encrypt/CN=R3"},
                "fingerprint": "9A:12:BC:77:00:FE",
                "not_before": 1700000000.0,
                "not_after": 1707776000.0,
                "all_domains": ["secure-paypal-login.com", "www.secure-paypal-login.com"]
            },
            "seen": 1700000123.456
        }
    }"#;

    #[test]
    fn test_decodes_certificate_update() {
        let event = CertificateEvent::from_json(CERT_UPDATE).unwrap();
        assert_eq!(event.message_type, MessageType::CertificateUpdate);
        assert_eq!(
            event.all_domains,
            vec!["secure-paypal-login.com", "www.secure-paypal-login.com"]
        );
        assert_eq!(event.subject_aggregated, "/CN=secure-paypal-login.com");
        assert_eq!(event.issuer_aggregated, "/C=US/O=Let's Encrypt/CN=R3");
        assert_eq!(event.fingerprint, "9A:12:BC:77:00:FE");
        assert_eq!(event.start_time(), "2023-11-14T22:13:20");
    }

    #[test]
    fn test_fractional_not_before_keeps_microseconds() {
        let event = CertificateEvent::from_json(
            r#"{"message_type": "certificate_update",
                "data": {"leaf_cert": {"all_domains": ["a.com"], "not_before": 1700000000.25}}}"#,
        )
        .unwrap();
        assert_eq!(event.start_time(), "2023-11-14T22:13:20.250000");

        let event = CertificateEvent::from_json(
            r#"{"message_type": "certificate_update",
                "data": {"leaf_cert": {"all_domains": ["a.com"], "not_before": 1700000000}}}"#,
        )
        .unwrap();
        assert_eq!(event.start_time(), "2023-11-14T22:13:20");
    }

    #[test]
    fn test_decodes_heartbeat() {
        let event =
            CertificateEvent::from_json(r#"{"message_type": "heartbeat", "timestamp": 1700000000.1}"#)
                .unwrap();
        assert_eq!(event, CertificateEvent::heartbeat());
    }

    #[test]
    fn test_unknown_message_type() {
        let event = CertificateEvent::from_json(r#"{"message_type": "dns_entries"}"#).unwrap();
        assert_eq!(event.message_type, MessageType::Other("dns_entries".to_string()));
        assert!(event.all_domains.is_empty());

        let event = CertificateEvent::from_json("{}").unwrap();
        assert_eq!(event.message_type, MessageType::Other(String::new()));
    }

    #[test]
    fn test_missing_leaf_cert_gives_empty_event() {
        let event =
            CertificateEvent::from_json(r#"{"message_type": "certificate_update", "data": {}}"#)
                .unwrap();
        assert!(event.all_domains.is_empty());
        assert_eq!(event.issuer_aggregated, "");
        assert_eq!(event.fingerprint, "");
        assert_eq!(event.start_time(), "");
    }

    #[test]
    fn test_mistyped_fields_are_tolerated() {
        let event = CertificateEvent::from_json(
            r#"{"message_type": "certificate_update",
                "data": {"leaf_cert": {
                    "all_domains": ["ok.com", 42, null, "also-ok.com"],
                    "issuer": "flat string",
                    "fingerprint": 12,
                    "not_before": "yesterday"}}}"#,
        )
        .unwrap();
        assert_eq!(event.all_domains, vec!["ok.com", "also-ok.com"]);
        assert_eq!(event.issuer_aggregated, "");
        assert_eq!(event.fingerprint, "");
        assert!(event.not_before.is_none());

        let event = CertificateEvent::from_json(
            r#"{"message_type": "certificate_update",
                "data": {"leaf_cert": {"all_domains": "not-a-list.com"}}}"#,
        )
        .unwrap();
        assert!(event.all_domains.is_empty());
    }

    #[test]
    fn test_integer_not_before() {
        let event = CertificateEvent::from_json(
            r#"{"message_type": "certificate_update",
                "data": {"leaf_cert": {"not_before": 0, "all_domains": []}}}"#,
        )
        .unwrap();
        assert_eq!(event.start_time(), "1970-01-01T00:00:00");
    }

    #[test]
    fn test_rejects_non_json_and_non_objects() {
        assert!(matches!(
            CertificateEvent::from_json("not json"),
            Err(EventError::InvalidJson(_))
        ));
        assert!(matches!(
            CertificateEvent::from_json(r#"["certificate_update"]"#),
            Err(EventError::NotAnObject)
        ));
    }
}
