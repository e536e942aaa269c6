//! Exponential reconnect backoff.
//!
//! `base * 2^attempt`, capped, with a bounded attempt budget. Exhausting the
//! budget is terminal: the link reports itself down and waits for external
//! intervention.

use std::time::Duration;

/// Reconnect backoff schedule
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl ExponentialBackoff {
    /// Create a schedule
    pub fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base: base.max(Duration::from_millis(1)),
            cap,
            max_attempts,
            attempt: 0,
        }
    }

    /// Delay before the next attempt, or `None` when the budget is exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }

        // Shift saturates well past any practical cap
        let factor = 1u64 << self.attempt.min(30);
        let delay = self
            .base
            .checked_mul(factor as u32)
            .unwrap_or(self.cap)
            .min(self.cap);

        self.attempt += 1;
        Some(delay)
    }

    /// Successful connection resets the schedule
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Attempts consumed so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// True once the budget is exhausted
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_until_cap() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(30), 10);

        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(500)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(2)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(4)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(8)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(16)));
        // 32s caps at 30s
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(30)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_budget_is_terminal() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(30), 3);

        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        assert!(backoff.is_exhausted());
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(30), 2);

        backoff.next_delay();
        backoff.next_delay();
        assert!(backoff.is_exhausted());

        backoff.reset();
        assert!(!backoff.is_exhausted());
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
    }
}
