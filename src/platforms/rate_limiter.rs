//! Outbound request budget for the marketplace API.
//!
//! warframe.market allows roughly 3 requests per second per client. The
//! limiter models this as a bucket of `capacity` tokens where each token
//! comes back exactly one `period` after it was spent. That gives the same
//! burst and sustained rate as a classic token bucket (3 tokens, 3/s refill,
//! starts full) while also guaranteeing that no rolling window of `period`
//! ever sees more than `capacity` requests.
//!
//! Waiters queue on a `tokio::sync::Mutex`, which is FIFO, and the lock is
//! held across the refill sleep so arrival order is preserved.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::types::ScanError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tokens available at start and the maximum burst.
pub const DEFAULT_CAPACITY: usize = 3;

/// Time after which a spent token becomes available again.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Limiter
// ---------------------------------------------------------------------------

pub struct RateLimiter {
    capacity: usize,
    period: Duration,
    /// Issue times of tokens still "in flight", oldest first.
    issued: Mutex<VecDeque<Instant>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl RateLimiter {
    /// Create a limiter with `capacity` tokens, each refilled `period`
    /// after use. A zero capacity is bumped to one.
    pub fn new(capacity: usize, period: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            period,
            issued: Mutex::new(VecDeque::with_capacity(capacity)),
            shutdown: None,
        }
    }

    /// The marketplace budget: 3 requests per second.
    pub fn marketplace() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_PERIOD)
    }

    /// Attach a shutdown flag. Once it reads `true`, pending and future
    /// waits fail with [`ScanError::Cancelled`].
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Block until a token is available, then consume it.
    pub async fn acquire(&self) -> Result<(), ScanError> {
        let mut shutdown = self.shutdown.clone();
        if is_cancelled(&shutdown) {
            return Err(ScanError::Cancelled);
        }

        let mut issued = self.issued.lock().await;

        loop {
            let now = Instant::now();
            while issued
                .front()
                .is_some_and(|&t| now.saturating_duration_since(t) >= self.period)
            {
                issued.pop_front();
            }

            if issued.len() < self.capacity {
                issued.push_back(now);
                trace!(in_flight = issued.len(), "Rate limiter token acquired");
                return Ok(());
            }

            // Oldest token returns one period after it was issued.
            let ready_at = issued[0] + self.period;
            debug!(
                wait_ms = ready_at.saturating_duration_since(now).as_millis() as u64,
                "Rate limited, waiting for token"
            );
            wait_until(ready_at, &mut shutdown).await?;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::marketplace()
    }
}

fn is_cancelled(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    shutdown.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Sleep until `deadline` unless the shutdown flag flips first.
async fn wait_until(
    deadline: Instant,
    shutdown: &mut Option<watch::Receiver<bool>>,
) -> Result<(), ScanError> {
    let Some(rx) = shutdown.as_mut() else {
        tokio::time::sleep_until(deadline).await;
        return Ok(());
    };

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return Ok(()),
            changed = rx.changed() => {
                match changed {
                    Ok(()) if *rx.borrow() => return Err(ScanError::Cancelled),
                    Ok(()) => continue,
                    // Sender gone: nobody can cancel any more.
                    Err(_) => {
                        tokio::time::sleep_until(deadline).await;
                        return Ok(());
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
