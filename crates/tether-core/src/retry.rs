//! Retry policy.

use std::time::Duration;

/// Fixed-delay retry budget for transient failures.
///
/// Total attempts for one logical call never exceed `max_retries + 1`.
/// The delay is constant between attempts; there is no exponential growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

    pub const fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// A policy that never retries.
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Whether another attempt may follow the given number of spent retries.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_three_retries_one_second_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn budget_bounds_attempts() {
        let policy = RetryPolicy::default();
        let retries = (0..10).take_while(|&a| policy.allows_retry(a)).count();
        assert_eq!(retries, 3);
        assert!(!RetryPolicy::none().allows_retry(0));
    }
}
