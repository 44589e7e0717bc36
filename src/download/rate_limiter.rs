//! Request pacing for catalog traffic.
//!
//! This module provides the [`RateLimiter`] struct which enforces a fixed
//! minimum delay between consecutive requests, so the collection API never
//! sees more than one record request per delay period from this process.
//!
//! # Overview
//!
//! Pacing is global: every worker of a run shares one limiter behind an
//! `Arc`, so the bound applies to the aggregate request rate, not to each
//! worker separately. There is no adaptivity, jitter, or backoff.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use harvester_core::download::RateLimiter;
//!
//! # async fn example() {
//! let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
//!
//! // First request proceeds immediately
//! limiter.acquire().await;
//!
//! // Second request waits until one second after the first
//! limiter.acquire().await;
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Global rate limiter for catalog requests.
///
/// `RateLimiter` is `Send + Sync` and meant to be wrapped in `Arc` and shared
/// across spawned Tokio tasks. The inner mutex is held across the sleep, so
/// concurrent callers are released one at a time, each at least `delay` after
/// the previous one.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum delay between two acquisitions.
    delay: Duration,

    /// Whether rate limiting is disabled (for `--rate-limit 0`).
    disabled: bool,

    /// Time of the last acquisition. `None` until the first request.
    last_request: Mutex<Option<Instant>>,

    /// Total delay applied so far, in milliseconds.
    total_delay_ms: AtomicU64,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified delay.
    ///
    /// A zero delay yields a disabled limiter.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use harvester_core::download::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(Duration::from_millis(1000));
    /// assert!(!limiter.is_disabled());
    /// ```
    #[must_use]
    #[instrument(skip_all, fields(delay_ms = delay.as_millis()))]
    pub fn new(delay: Duration) -> Self {
        if delay.is_zero() {
            return Self::disabled();
        }
        debug!("creating rate limiter");
        Self {
            delay,
            disabled: false,
            last_request: Mutex::new(None),
            total_delay_ms: AtomicU64::new(0),
        }
    }

    /// Creates a disabled rate limiter that applies no delays.
    #[must_use]
    pub fn disabled() -> Self {
        debug!("creating disabled rate limiter");
        Self {
            delay: Duration::ZERO,
            disabled: true,
            last_request: Mutex::new(None),
            total_delay_ms: AtomicU64::new(0),
        }
    }

    /// Returns whether rate limiting is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the configured delay between requests.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the cumulative time callers have spent waiting.
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        Duration::from_millis(self.total_delay_ms.load(Ordering::SeqCst))
    }

    /// Waits until a request may be issued.
    ///
    /// The first call returns immediately. Each later call returns no sooner
    /// than `delay` after the previous call returned.
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                let wait = self.delay.saturating_sub(elapsed);
                let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
                self.total_delay_ms.fetch_add(wait_ms, Ordering::SeqCst);
                debug!(wait_ms = wait.as_millis(), "applying rate limit delay");
                tokio::time::sleep(wait).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_rate_limiter_new_creates_with_delay() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        assert_eq!(limiter.delay(), Duration::from_millis(500));
        assert!(!limiter.is_disabled());
    }

    #[test]
    fn test_rate_limiter_zero_delay_is_disabled() {
        let limiter = RateLimiter::new(Duration::ZERO);
        assert!(limiter.is_disabled());
        assert_eq!(limiter.delay(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_disabled_no_delay() {
        tokio::time::pause();

        let limiter = RateLimiter::disabled();
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_first_request_no_delay() {
        tokio::time::pause();

        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_consecutive_requests() {
        tokio::time::pause();

        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_millis(1100));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(limiter.total_delay() >= Duration::from_millis(1900));
    }

    #[tokio::test]
    async fn test_rate_limiter_no_wait_when_delay_already_elapsed() {
        tokio::time::pause();

        let limiter = RateLimiter::new(Duration::from_secs(1));
        limiter.acquire().await;

        tokio::time::advance(Duration::from_secs(2)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_bounds_aggregate_rate_across_tasks() {
        tokio::time::pause();

        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Four acquisitions need three full delays between them.
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
