//! Rate limiting for WebSocket messages.
//!
//! Each connection gets a [`MessageLimiter`]: a short burst window layered over a longer
//! sustained window, both sliding.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Example
    ///
    /// ```
    /// use cf_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let mut limiter = RateLimiter::new(2, Duration::from_secs(1));
    /// assert!(limiter.check());
    /// assert!(limiter.check());
    /// assert!(!limiter.check());
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// 10 messages per second
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// 100 messages per minute
    pub fn sustained() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    fn evict(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record a request if it fits in the window.
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        self.evict(now);

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Whether a request would be allowed, without recording one
    pub fn has_capacity(&mut self) -> bool {
        self.evict(Instant::now());
        self.timestamps.len() < self.max_requests
    }

    /// Number of requests still allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }

    /// Time until the oldest request leaves the window
    pub fn reset_in(&self) -> Option<Duration> {
        self.timestamps.front().map(|oldest| {
            let elapsed = Instant::now().duration_since(*oldest);
            self.window.saturating_sub(elapsed)
        })
    }
}

/// Which window turned a message away
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LimitExceeded {
    Burst,
    Sustained,
}

impl LimitExceeded {
    /// Text sent back to the client
    pub fn message(self) -> &'static str {
        match self {
            Self::Burst => "Rate limit exceeded. Please slow down.",
            Self::Sustained => "Too many messages. Please wait before sending more.",
        }
    }
}

/// Burst and sustained limits for one connection
#[derive(Debug)]
pub struct MessageLimiter {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl Default for MessageLimiter {
    fn default() -> Self {
        Self::new(RateLimiter::burst(), RateLimiter::sustained())
    }
}

impl MessageLimiter {
    pub fn new(burst: RateLimiter, sustained: RateLimiter) -> Self {
        Self { burst, sustained }
    }

    /// Admit a message only when both windows have room. A message rejected by one window
    /// is not counted against the other.
    pub fn check(&mut self) -> Result<(), LimitExceeded> {
        if !self.burst.has_capacity() {
            return Err(LimitExceeded::Burst);
        }
        if !self.sustained.has_capacity() {
            return Err(LimitExceeded::Sustained);
        }

        self.burst.check();
        self.sustained.check();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(1));

        for _ in 0..3 {
            assert!(limiter.check());
        }

        assert!(!limiter.check(), "Should block request over limit");
    }

    #[test]
    fn test_rate_limiter_window_expiry() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(100));

        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());

        thread::sleep(Duration::from_millis(150));

        assert!(limiter.check(), "Should allow after window expires");
    }

    #[test]
    fn test_burst_limiter() {
        let mut limiter = RateLimiter::burst();

        for _ in 0..10 {
            assert!(limiter.check());
        }

        assert!(!limiter.check(), "Burst limiter should block 11th request");
    }

    #[test]
    fn test_remaining_and_reset_in() {
        let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
        assert_eq!(limiter.remaining(), 5);
        assert!(limiter.reset_in().is_none());

        limiter.check();
        limiter.check();
        assert_eq!(limiter.remaining(), 3);
        assert!(limiter.reset_in().is_some_and(|d| d <= Duration::from_secs(1)));
    }

    #[test]
    fn test_has_capacity_does_not_record() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(1));
        assert!(limiter.has_capacity());
        assert!(limiter.has_capacity());
        assert!(limiter.check());
        assert!(!limiter.has_capacity());
    }

    #[test]
    fn test_message_limiter_reports_window() {
        let mut limiter = MessageLimiter::new(
            RateLimiter::new(2, Duration::from_secs(1)),
            RateLimiter::new(3, Duration::from_secs(60)),
        );

        assert_eq!(limiter.check(), Ok(()));
        assert_eq!(limiter.check(), Ok(()));
        assert_eq!(limiter.check(), Err(LimitExceeded::Burst));
    }

    #[test]
    fn test_message_limiter_sustained_window() {
        let mut limiter = MessageLimiter::new(
            RateLimiter::new(2, Duration::from_millis(50)),
            RateLimiter::new(3, Duration::from_secs(60)),
        );

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        thread::sleep(Duration::from_millis(80));
        assert!(limiter.check().is_ok());
        thread::sleep(Duration::from_millis(80));
        assert_eq!(limiter.check(), Err(LimitExceeded::Sustained));
    }
}
