//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

use crate::resilience::retries::RetryPolicy;

/// Delay before retry number `attempt` (1-based) under `policy`.
///
/// Doubles from `base_delay_ms`, capped at `max_delay_ms`, plus up to 10%
/// random jitter.
pub fn calculate_backoff(attempt: u32, policy: &RetryPolicy) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = policy
        .base_delay_ms
        .saturating_mul(factor)
        .min(policy.max_delay_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base: u64, max: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay_ms: base,
            max_delay_ms: max,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let p = policy(100, 1000);
        assert_eq!(calculate_backoff(0, &p), Duration::ZERO);

        let first = calculate_backoff(1, &p).as_millis();
        assert!((100..110).contains(&first));

        let second = calculate_backoff(2, &p).as_millis();
        assert!((200..220).contains(&second));

        let capped = calculate_backoff(10, &p).as_millis();
        assert!((1000..1100).contains(&capped));
    }

    #[test]
    fn test_zero_base_means_no_delay() {
        assert_eq!(calculate_backoff(3, &policy(0, 1000)), Duration::ZERO);
    }
}
