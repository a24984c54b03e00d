// ── Per-task retry backoff ──
//
// Each polling task owns one of these. The delay starts at the task's
// normal interval, doubles per consecutive failure up to a cap, and snaps
// back after any successful round.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            failures: 0,
        }
    }

    /// Delay before the next round: `min(base * 2^failures, max)`.
    pub fn delay(&self) -> Duration {
        let factor = 1_u32.checked_shl(self.failures).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    pub fn record_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        self.delay()
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_increases_exponentially() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(300));
        assert_eq!(backoff.delay(), Duration::from_secs(2));
        assert_eq!(backoff.record_failure(), Duration::from_secs(4));
        assert_eq!(backoff.record_failure(), Duration::from_secs(8));
        assert_eq!(backoff.record_failure(), Duration::from_secs(16));
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let mut backoff = Backoff::new(Duration::from_secs(30), Duration::from_secs(300));
        for _ in 0..40 {
            backoff.record_failure();
        }
        assert_eq!(backoff.delay(), Duration::from_secs(300));
    }

    #[test]
    fn success_resets_to_the_interval() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(60));
        backoff.record_failure();
        backoff.record_failure();
        backoff.reset();
        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.delay(), Duration::from_secs(2));
    }

    #[test]
    fn cap_below_interval_is_raised() {
        let backoff = Backoff::new(Duration::from_secs(30), Duration::from_secs(5));
        assert_eq!(backoff.delay(), Duration::from_secs(30));
    }
}
