//! Feed input.
//!
//! The bundled feed collaborator reads certstream messages as JSON lines, the
//! format `certstream --json` writes, from a file or from stdin. A live
//! connection is expected to arrive through stdin; a file is a replay.

use std::path::Path;

use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::config::{FeedEndpoint, STDIN_INPUT};

/// Line stream of raw feed messages.
pub type FeedLines = Lines<Box<dyn AsyncBufRead + Unpin + Send>>;

/// What to do with an event when every handler slot is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait for a slot. Used for replays, where nothing upstream can time out.
    Wait,
    /// Log and drop the event so the live feed is never held back.
    Drop,
}

/// An opened feed: its lines and how to treat overflow.
pub struct FeedInput {
    pub lines: FeedLines,
    pub overflow: OverflowPolicy,
    /// Human-readable origin for logs
    pub origin: String,
}

/// Opens `input` (`-` for stdin).
pub async fn open_input(input: &Path) -> std::io::Result<FeedInput> {
    if input.as_os_str() == STDIN_INPUT {
        let reader: Box<dyn AsyncBufRead + Unpin + Send> =
            Box::new(BufReader::new(tokio::io::stdin()));
        return Ok(FeedInput {
            lines: reader.lines(),
            overflow: OverflowPolicy::Drop,
            origin: "stdin".to_string(),
        });
    }

    let file = tokio::fs::File::open(input).await?;
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(BufReader::new(file));
    Ok(FeedInput {
        lines: reader.lines(),
        overflow: OverflowPolicy::Wait,
        origin: input.display().to_string(),
    })
}

/// Wraps any in-memory reader, mainly for tests and embedding.
pub fn feed_from_reader<R>(reader: R, overflow: OverflowPolicy) -> FeedInput
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);
    FeedInput {
        lines: reader.lines(),
        overflow,
        origin: "reader".to_string(),
    }
}

/// Logs the aggregator identity and proxy handed to the feed connection.
pub fn log_endpoint(endpoint: &FeedEndpoint, origin: &str) {
    match &endpoint.proxy {
        Some(proxy) => info!(
            "Feed endpoint {} via proxy {}:{} (user: {}), reading messages from {}",
            endpoint.url,
            proxy.host,
            proxy
                .port
                .map(|p| p.to_string())
                .unwrap_or_else(|| "default".to_string()),
            proxy.username.as_deref().unwrap_or("none"),
            origin
        ),
        None => info!(
            "Feed endpoint {}, reading messages from {}",
            endpoint.url, origin
        ),
    }
}
