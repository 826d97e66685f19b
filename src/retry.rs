//! Retry policy
//!
//! Uniform jitter, no exponential growth: the budget is small and the usual
//! failure is upstream rate limiting.

use std::time::Duration;

use rand::Rng;

/// Default attempt budget
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Bounded retry policy with jittered backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry counter start value. Each failure decrements it and another
    /// attempt is made only while it stays above zero, so `3` allows three
    /// attempts and `0` a single one.
    pub max_retries: u32,
    /// Fixed part of every backoff sleep
    pub backoff_base: Duration,
    /// Upper bound (exclusive) of the random part of every backoff sleep
    pub backoff_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_millis(1000),
            backoff_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff sleep: `backoff_base + uniform[0, backoff_jitter)`
    pub fn backoff_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_ms = self.backoff_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.backoff_base;
        }
        self.backoff_base + Duration::from_millis(rng.gen_range(0..jitter_ms))
    }
}

/// What a caller gets back once the retry budget is spent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExhaustedPolicy {
    /// Always return the final error
    #[default]
    Propagate,
    /// Return a final non-2xx response as data; transport failures still
    /// propagate
    ReturnUpstreamBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_base, Duration::from_secs(1));
        assert_eq!(policy.backoff_jitter, Duration::from_secs(1));
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }

    #[test]
    fn test_backoff_delay_bounds() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..1000 {
            let d = policy.backoff_delay(&mut rng);
            assert!(d >= Duration::from_millis(1000));
            assert!(d < Duration::from_millis(2000));
        }
    }

    #[test]
    fn test_zero_jitter_is_fixed() {
        let policy = RetryPolicy {
            backoff_jitter: Duration::ZERO,
            backoff_base: Duration::from_millis(250),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(policy.backoff_delay(&mut rng), Duration::from_millis(250));
    }
}
