//! Circuit breaker for store access.
//!
//! After N consecutive store failures the circuit opens and lookups/inserts are
//! skipped (the event is dropped) until a cooldown expires. This keeps an
//! unavailable database from adding an acquire timeout to every event.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::{STORE_COOLDOWN, STORE_FAILURE_THRESHOLD};

/// Sentinel for "circuit closed" in `opened_at_ms`.
const CLOSED: u64 = u64::MAX;

/// Lock-free breaker shared by every handler task.
pub struct StoreCircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    consecutive_failures: AtomicU32,
    /// Milliseconds since `epoch` when the circuit opened, or `CLOSED`.
    opened_at_ms: AtomicU64,
    epoch: Instant,
}

impl StoreCircuitBreaker {
    /// Breaker with the default threshold and cooldown.
    pub fn new() -> Self {
        Self::with_threshold(STORE_FAILURE_THRESHOLD, STORE_COOLDOWN)
    }

    pub fn with_threshold(failure_threshold: u32, cooldown: Duration) -> Self {
        StoreCircuitBreaker {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            consecutive_failures: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(CLOSED),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX - 1)
    }

    /// Whether the store may be used right now.
    ///
    /// Once the cooldown has passed the circuit half-opens: calls are allowed
    /// again and the next result decides whether it closes or re-opens.
    pub fn allow(&self) -> bool {
        let opened = self.opened_at_ms.load(Ordering::Acquire);
        if opened == CLOSED {
            return true;
        }
        let cooldown_ms = u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX);
        self.now_ms().saturating_sub(opened) >= cooldown_ms
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
        if self.opened_at_ms.swap(CLOSED, Ordering::AcqRel) != CLOSED {
            log::info!("Store circuit breaker closed after a successful operation");
        }
    }

    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        if failures < self.failure_threshold {
            return;
        }
        let previous = self.opened_at_ms.swap(self.now_ms(), Ordering::AcqRel);
        if previous == CLOSED {
            log::error!(
                "Store circuit breaker opened after {} consecutive failures (cooldown: {}s)",
                failures,
                self.cooldown.as_secs()
            );
        }
    }

    pub fn is_open(&self) -> bool {
        self.opened_at_ms.load(Ordering::Acquire) != CLOSED
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }
}

impl Default for StoreCircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
