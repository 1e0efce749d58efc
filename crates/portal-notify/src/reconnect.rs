//! Reconnect schedule.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delays before reconnect attempts 1, 2, 3 and 4+, in milliseconds.
pub const DEFAULT_RECONNECT_DELAYS_MS: [u64; 4] = [0, 2_000, 10_000, 30_000];

/// Delay before reconnect `attempt` (1-based) on the default schedule.
///
/// ```rust
/// use portal_notify::reconnect::delay_for_attempt;
/// use std::time::Duration;
///
/// assert_eq!(delay_for_attempt(1), Duration::ZERO);
/// assert_eq!(delay_for_attempt(7), Duration::from_secs(30));
/// ```
pub fn delay_for_attempt(attempt: u32) -> Duration {
    Duration::from_millis(schedule_delay(&DEFAULT_RECONNECT_DELAYS_MS, attempt))
}

fn schedule_delay(delays_ms: &[u64], attempt: u32) -> u64 {
    let index = (attempt.max(1) - 1) as usize;
    delays_ms
        .get(index)
        .or_else(|| delays_ms.last())
        .copied()
        .unwrap_or(0)
}

/// When to retry after the connection is lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Delays for successive attempts; the last one repeats.
    pub delays_ms: Vec<u64>,

    /// Give up after this many attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delays_ms: DEFAULT_RECONNECT_DELAYS_MS.to_vec(),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before `attempt` (1-based), or `None` once attempts are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        Some(Duration::from_millis(schedule_delay(&self.delays_ms, attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let delays: Vec<u64> = (1..=5).map(|n| delay_for_attempt(n).as_millis() as u64).collect();
        assert_eq!(delays, vec![0, 2000, 10000, 30000, 30000]);
        assert_eq!(delay_for_attempt(100), Duration::from_secs(30));
    }

    #[test]
    fn test_attempt_zero_is_first() {
        assert_eq!(delay_for_attempt(0), Duration::ZERO);
    }

    #[test]
    fn test_policy_unbounded_by_default() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for(1_000), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_policy_max_attempts() {
        let policy = ReconnectPolicy {
            delays_ms: vec![10],
            max_attempts: Some(2),
        };
        assert_eq!(policy.delay_for(2), Some(Duration::from_millis(10)));
        assert_eq!(policy.delay_for(3), None);

        let never = ReconnectPolicy {
            delays_ms: vec![],
            max_attempts: Some(0),
        };
        assert_eq!(never.delay_for(1), None);
    }
}
