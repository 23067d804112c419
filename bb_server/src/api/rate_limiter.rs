//! Rate limiter for OTP issuance.
//!
//! Limits how often a one-time code can be requested for the same mobile
//! number within a time window, so the issue endpoint cannot be used to
//! hammer an SMS gateway.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Sliding-window rate limiter keyed by an arbitrary string (here: the
/// mobile number requesting a code)
#[derive(Debug)]
pub struct KeyedRateLimiter {
    /// Timestamps of recent requests per key
    windows: HashMap<String, VecDeque<Instant>>,
    /// Maximum number of requests allowed per key in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl KeyedRateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Maximum number of requests allowed per key in the window
    /// * `window` - Time window duration
    ///
    /// # Example
    ///
    /// ```
    /// use bb_server::api::rate_limiter::KeyedRateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 5 OTP sends per number per 5 minutes
    /// let limiter = KeyedRateLimiter::new(5, Duration::from_secs(300));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: HashMap::new(),
            max_requests,
            window,
        }
    }

    /// Check if a request for `key` should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    ///
    /// # Example
    ///
    /// ```
    /// # use bb_server::api::rate_limiter::KeyedRateLimiter;
    /// # use std::time::Duration;
    /// let mut limiter = KeyedRateLimiter::new(3, Duration::from_secs(1));
    ///
    /// // First 3 requests allowed
    /// for _ in 0..3 {
    ///     assert!(limiter.check("0241000001"));
    /// }
    ///
    /// // 4th request blocked; other numbers unaffected
    /// assert!(!limiter.check("0241000001"));
    /// assert!(limiter.check("0241000002"));
    /// ```
    pub fn check(&mut self, key: &str) -> bool {
        let now = Instant::now();
        self.prune(now);

        let timestamps = self.windows.entry(key.to_string()).or_default();

        // Remove timestamps outside the window
        while let Some(ts) = timestamps.front() {
            if now.duration_since(*ts) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        // Check if limit exceeded
        if timestamps.len() >= self.max_requests {
            return false;
        }

        // Record this request
        timestamps.push_back(now);
        true
    }

    /// Get the number of remaining requests allowed for `key` in the current
    /// window
    pub fn remaining(&self, key: &str) -> usize {
        let now = Instant::now();
        let used = self
            .windows
            .get(key)
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|ts| now.duration_since(**ts) <= self.window)
                    .count()
            })
            .unwrap_or(0);
        self.max_requests.saturating_sub(used)
    }

    /// Get the time until the oldest request for `key` expires
    ///
    /// Returns `None` if the key has no requests in the current window.
    pub fn reset_in(&self, key: &str) -> Option<Duration> {
        self.windows.get(key).and_then(|timestamps| {
            timestamps.front().map(|oldest| {
                let elapsed = Instant::now().duration_since(*oldest);
                self.window.saturating_sub(elapsed)
            })
        })
    }

    /// Number of keys currently tracked
    #[allow(dead_code)]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drop keys whose every timestamp has aged out, so the map does not grow
    /// with one entry per number ever seen
    fn prune(&mut self, now: Instant) {
        self.windows.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|ts| now.duration_since(*ts) <= self.window)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rate_limiter_allows_within_limit() {
        let mut limiter = KeyedRateLimiter::new(5, Duration::from_secs(1));

        for _ in 0..5 {
            assert!(limiter.check("0241"), "Should allow requests within limit");
        }
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = KeyedRateLimiter::new(3, Duration::from_secs(1));

        // First 3 allowed
        for _ in 0..3 {
            assert!(limiter.check("0241"));
        }

        // 4th blocked
        assert!(!limiter.check("0241"), "Should block request over limit");
    }

    #[test]
    fn test_rate_limiter_keys_are_independent() {
        let mut limiter = KeyedRateLimiter::new(2, Duration::from_secs(1));

        assert!(limiter.check("0241000001"));
        assert!(limiter.check("0241000001"));
        assert!(!limiter.check("0241000001"));

        // A different number still has its full allowance
        assert!(limiter.check("0541000002"));
    }

    #[test]
    fn test_rate_limiter_window_expiry() {
        let mut limiter = KeyedRateLimiter::new(2, Duration::from_millis(100));

        // Use up limit
        assert!(limiter.check("0241"));
        assert!(limiter.check("0241"));
        assert!(!limiter.check("0241"));

        // Wait for window to expire
        thread::sleep(Duration::from_millis(150));

        // Should allow again
        assert!(limiter.check("0241"), "Should allow after window expires");
    }

    #[test]
    fn test_remaining_count() {
        let mut limiter = KeyedRateLimiter::new(5, Duration::from_secs(1));

        assert_eq!(limiter.remaining("0241"), 5, "Should have 5 remaining initially");

        limiter.check("0241");
        assert_eq!(limiter.remaining("0241"), 4, "Should have 4 remaining after 1 request");

        limiter.check("0241");
        limiter.check("0241");
        assert_eq!(limiter.remaining("0241"), 2, "Should have 2 remaining after 3 requests");
    }

    #[test]
    fn test_reset_in() {
        let mut limiter = KeyedRateLimiter::new(5, Duration::from_secs(1));

        // No requests yet
        assert!(limiter.reset_in("0241").is_none(), "Should be None with no requests");

        // Make a request
        limiter.check("0241");
        let reset_time = limiter.reset_in("0241");
        assert!(reset_time.is_some(), "Should have reset time after request");

        // Reset time should be approximately 1 second (allowing some tolerance)
        let reset_duration = reset_time.unwrap();
        assert!(
            reset_duration <= Duration::from_secs(1),
            "Reset time should be at most 1 second"
        );
    }

    #[test]
    fn test_idle_keys_are_pruned() {
        let mut limiter = KeyedRateLimiter::new(2, Duration::from_millis(50));

        limiter.check("0241000001");
        limiter.check("0541000002");
        assert_eq!(limiter.tracked_keys(), 2);

        thread::sleep(Duration::from_millis(80));

        // The next check sweeps both aged-out windows
        limiter.check("0551000003");
        assert_eq!(limiter.tracked_keys(), 1, "Aged-out keys should be dropped");
    }
}
