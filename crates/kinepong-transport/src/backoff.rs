//! Reconnect policy
//!
//! The first retry after any close is immediate. Attempts that keep failing
//! without ever reaching Open are spaced exponentially up to `max_delay`.

use std::time::Duration;

use rand::Rng;

/// Reconnect pacing
#[derive(Clone, Debug, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the second consecutive failed retry
    pub initial_delay: Duration,
    /// Upper bound on any delay
    pub max_delay: Duration,
    /// Growth factor per consecutive failure (>= 1.0)
    pub multiplier: f64,
    /// Scale each delay by a random factor in [0.5, 1.0]
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ReconnectPolicy {
    /// Retry on every poll with no delay
    pub fn immediate() -> Self {
        ReconnectPolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Delay before the next attempt given the number of consecutive
    /// attempts that failed without opening.
    pub fn delay_for(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = (consecutive_failures - 1).min(32) as i32;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        let scaled = if self.jitter {
            capped * rand::thread_rng().gen_range(0.5..=1.0)
        } else {
            capped
        };
        Duration::from_secs_f64(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_jitter() -> ReconnectPolicy {
        ReconnectPolicy {
            jitter: false,
            ..ReconnectPolicy::default()
        }
    }

    #[test]
    fn test_first_retry_immediate() {
        assert_eq!(no_jitter().delay_for(0), Duration::ZERO);
        assert_eq!(ReconnectPolicy::default().delay_for(0), Duration::ZERO);
    }

    #[test]
    fn test_exponential_growth() {
        let policy = no_jitter();
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(10), Duration::from_secs(5));
    }

    #[test]
    fn test_immediate_policy() {
        let policy = ReconnectPolicy::immediate();
        for failures in 0..20 {
            assert_eq!(policy.delay_for(failures), Duration::ZERO);
        }
    }

    proptest! {
        #[test]
        fn prop_delay_bounded(failures in 0u32..10_000) {
            let policy = ReconnectPolicy::default();
            prop_assert!(policy.delay_for(failures) <= policy.max_delay);
        }

        #[test]
        fn prop_delay_monotonic_without_jitter(failures in 1u32..64) {
            let policy = no_jitter();
            prop_assert!(policy.delay_for(failures) <= policy.delay_for(failures + 1));
        }
    }
}
