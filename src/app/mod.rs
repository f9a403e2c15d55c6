//! Main application modules.
//!
//! Progress logging, signal-driven shutdown and statistics printing used by the
//! run loop.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::spawn_progress_logger;
pub use shutdown::{shutdown_gracefully, spawn_signal_listener};
pub use statistics::{log_summary, print_statistics};
