//! Cache policy.

use std::time::Duration;

const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Caching and retry policy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a fetched value counts as fresh.
    pub stale_time: Duration,
    /// How long an unobserved value is kept before eviction.
    pub gc_time: Duration,
    /// Retries after the first failed attempt. Only retryable errors count.
    pub retry: u32,
    /// Refetch stale observed queries when the window regains focus.
    pub refetch_on_window_focus: bool,
    /// Refetch a stale value when a handle fetches it, instead of serving it.
    pub refetch_on_mount: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: TEN_MINUTES,
            gc_time: TEN_MINUTES,
            retry: 2,
            refetch_on_window_focus: true,
            refetch_on_mount: true,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub const fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn with_refetch_on_mount(mut self, refetch: bool) -> Self {
        self.refetch_on_mount = refetch;
        self
    }
}

/// Delay before retry number `attempt + 1`: 1s, 2s, 4s, ... capped at 30s.
#[must_use]
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt)).min(MAX_RETRY_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = QueryOptions::default();
        assert_eq!(options.stale_time, Duration::from_secs(600));
        assert_eq!(options.gc_time, Duration::from_secs(600));
        assert_eq!(options.retry, 2);
        assert!(options.refetch_on_window_focus);
        assert!(options.refetch_on_mount);
    }

    #[test]
    fn test_retry_delay_backs_off_and_caps() {
        assert_eq!(retry_delay(0), Duration::from_secs(1));
        assert_eq!(retry_delay(1), Duration::from_secs(2));
        assert_eq!(retry_delay(4), Duration::from_secs(16));
        assert_eq!(retry_delay(5), Duration::from_secs(30));
        assert_eq!(retry_delay(200), Duration::from_secs(30));
    }
}
