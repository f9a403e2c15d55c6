//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, store limits, etc.)
//! - CLI option types and parsing
//! - The library `Config` and its validation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    validate_table_name, Config, FeedEndpoint, LogFormat, LogLevel, Opt, ProxyConfig,
};
