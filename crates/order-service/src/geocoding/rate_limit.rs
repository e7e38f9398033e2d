//! Minimum spacing between calls to a rate-limited upstream.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lets callers through no more often than once per `min_interval`.
///
/// The limiter is an ordinary value: share it with `Arc` between every
/// component that talks to the same upstream. Waiters queue on the inner
/// mutex, so they are released one interval apart in arrival order. Uses
/// Tokio's clock, which tests can pause and advance.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    next_allowed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_allowed: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next call is allowed and books the slot after it.
    pub async fn acquire(&self) {
        let mut next_allowed = self.next_allowed.lock().await;
        if let Some(at) = *next_allowed {
            if at > Instant::now() {
                tokio::time::sleep_until(at).await;
            }
        }
        *next_allowed = Some(Instant::now() + self.min_interval);
    }
}
