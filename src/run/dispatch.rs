//! Feed consumption.
//!
//! Reads feed lines, parses each into a [`CertificateEvent`] and hands it to
//! [`Monitor::handle`] on its own task. A semaphore bounds how many events are
//! in flight; what happens when it is exhausted depends on the input's
//! [`OverflowPolicy`].

use std::io::ErrorKind;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, ProcessingStats};
use crate::feed::{CertificateEvent, FeedInput, MessageType, OverflowPolicy};
use crate::monitor::Monitor;

/// Consumes `input` until it ends or `cancel` fires, then waits for every
/// in-flight event to finish.
///
/// Malformed lines are counted and skipped. Only a read error other than
/// invalid UTF-8 ends the run with an error, after in-flight events drain.
pub async fn consume_feed(
    mut input: FeedInput,
    monitor: Arc<Monitor>,
    max_concurrency: usize,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let stats = Arc::clone(monitor.stats());
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut tasks: FuturesUnordered<JoinHandle<()>> = FuturesUnordered::new();
    let mut read_error = None;

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Stopping feed consumption, {} event(s) in flight", tasks.len());
                break;
            }
            Some(result) = tasks.next(), if !tasks.is_empty() => {
                reap(result, &stats);
                continue;
            }
            line = input.lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Feed {} ended", input.origin);
                break;
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                stats.increment_error(ErrorType::MalformedEvent);
                warn!("Skipping unreadable feed line: {}", e);
                continue;
            }
            Err(e) => {
                read_error = Some(e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event = match CertificateEvent::from_json(trimmed) {
            Ok(event) => event,
            Err(e) => {
                stats.increment_error(ErrorType::MalformedEvent);
                debug!("Skipping malformed feed message: {}", e);
                continue;
            }
        };

        // No store work behind these
        if event.message_type != MessageType::CertificateUpdate {
            monitor.handle(&event).await;
            continue;
        }

        let permit = match input.overflow {
            OverflowPolicy::Wait => {
                let acquired = tokio::select! {
                    _ = cancel.cancelled() => None,
                    permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
                };
                match acquired {
                    Some(permit) => permit,
                    None => break,
                }
            }
            OverflowPolicy::Drop => match Arc::clone(&semaphore).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    stats.increment_error(ErrorType::EventDropped);
                    debug!(
                        "All {} handlers busy, dropping event for {:?}",
                        max_concurrency, event.all_domains
                    );
                    continue;
                }
            },
        };

        let monitor = Arc::clone(&monitor);
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            monitor.handle(&event).await;
        }));
    }

    while let Some(result) = tasks.next().await {
        reap(result, &stats);
    }

    match read_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn reap(result: Result<(), JoinError>, stats: &ProcessingStats) {
    if let Err(join_error) = result {
        stats.increment_error(ErrorType::TaskPanicked);
        warn!("Event handler panicked: {:?}", join_error);
    }
}
