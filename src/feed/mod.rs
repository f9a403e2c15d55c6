//! Certificate Transparency feed input.
//!
//! Decodes certstream messages into `CertificateEvent`s and opens the line
//! stream they arrive on.

mod event;
mod source;

pub use event::{format_timestamp, CertificateEvent, MessageType};
pub use source::{feed_from_reader, log_endpoint, open_input, FeedInput, FeedLines, OverflowPolicy};
