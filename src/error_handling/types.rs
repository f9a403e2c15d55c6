//! Error type definitions.
//!
//! Startup failures (`ConfigError`, `InitializationError`) are fatal and stop the
//! process before the feed is consumed. `DatabaseError` and `EventError` are
//! per-event: they are logged, counted and the event is dropped.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., log file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),
}

/// Invalid configuration. Always fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No search pattern was supplied.
    #[error("search pattern must not be empty")]
    EmptySearchPattern,

    /// A pattern failed to compile.
    #[error("invalid {name} pattern: {source}")]
    InvalidPattern {
        /// Which pattern was rejected ("search" or "blacklist").
        name: &'static str,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The detection threshold must be at least 1.
    #[error("detection threshold must be a positive integer, got {0}")]
    NonPositiveThreshold(i64),

    /// The table name is not a plain SQL identifier.
    #[error("invalid table name {0:?}: use letters, digits and underscores only")]
    InvalidTableName(String),

    /// `max_concurrency` is zero or above the supported limit.
    #[error("max concurrency must be between 1 and {max}, got {value}")]
    InvalidConcurrency {
        /// Rejected value.
        value: usize,
        /// Upper bound.
        max: usize,
    },

    /// Proxy credentials or port were given without a proxy host.
    #[error("proxy port or credentials given without a proxy host")]
    ProxyWithoutHost,
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// The store was configured with an unusable value (e.g. table name).
    #[error("Store configuration error: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Store access skipped because the write circuit breaker is open.
    #[error("store unavailable: circuit breaker open")]
    CircuitOpen,
}

/// A feed message that could not be turned into an event.
#[derive(Error, Debug)]
pub enum EventError {
    /// The line is not valid JSON.
    #[error("malformed feed message: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The message is JSON but not an object.
    #[error("feed message is not a JSON object")]
    NotAnObject,
}

/// Failures counted while consuming the feed.
///
/// None of these stop the consumer; each one drops the affected event or hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// Feed line could not be parsed
    MalformedEvent,
    /// `exists` lookup failed
    StoreLookupError,
    /// Insert failed
    StoreInsertError,
    /// Store skipped while the circuit breaker was open
    StoreUnavailable,
    /// Dropped because every handler slot was busy
    EventDropped,
    /// A handler task panicked
    TaskPanicked,
}

/// Informational counters for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    EventReceived,
    Heartbeat,
    UnknownMessageType,
    HostnameScanned,
    FullDetection,
    PartialDetection,
    DuplicateDetection,
    BlacklistSuppressed,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::MalformedEvent => "Malformed feed message",
            ErrorType::StoreLookupError => "Store lookup error",
            ErrorType::StoreInsertError => "Store insert error",
            ErrorType::StoreUnavailable => "Store unavailable (circuit open)",
            ErrorType::EventDropped => "Events dropped (handlers busy)",
            ErrorType::TaskPanicked => "Handler task panicked",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::EventReceived => "Events received",
            InfoType::Heartbeat => "Heartbeats",
            InfoType::UnknownMessageType => "Other message types",
            InfoType::HostnameScanned => "Hostnames scanned",
            InfoType::FullDetection => "New detections",
            InfoType::PartialDetection => "Below-threshold matches",
            InfoType::DuplicateDetection => "Already-known detections",
            InfoType::BlacklistSuppressed => "Blacklist suppressions",
        }
    }
}
