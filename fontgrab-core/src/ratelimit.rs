//! Per-source rate limiting
//!
//! The tree/contents API and the stylesheet endpoint tolerate very
//! different request rates, so each source class carries its own limiter
//! instance. Callers are served first-come-first-served by wall-clock
//! arrival; there is no fairness guarantee.

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Enforces a minimum interval between calls attributed to one instance.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(calls_per_second: f64) -> Self {
        Self {
            min_interval: Duration::from_secs_f64(1.0 / calls_per_second),
            last_call: None,
        }
    }

    /// Block until at least `1/calls_per_second` has elapsed since the
    /// previous call, then stamp the current time.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let mut limiter = RateLimiter::new(1.0);
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enforces_min_interval() {
        let mut limiter = RateLimiter::new(10.0);
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        // Two enforced gaps of 100ms each.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_elapsed() {
        let mut limiter = RateLimiter::new(10.0);
        limiter.wait().await;
        sleep(Duration::from_millis(150)).await;
        let before = Instant::now();
        limiter.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
