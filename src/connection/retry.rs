//! Bounded retry with a fixed backoff interval
//!
//! One primitive covers the three retry loops of the link:
//! - transport bring-up at boot: one burst, exhaustion is fatal;
//! - acceptor reconnection: a burst per check tick, repeated forever;
//! - initiator reconnection: one attempt per interval, up to a ceiling.

use crate::hardware::Clock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt limit and spacing, as configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, interval_ms: u64) -> Self {
        Self {
            max_attempts,
            interval_ms,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// What happens once the attempt limit is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMode {
    /// Stop for good until an explicit reset
    Ceiling,
    /// The limit bounds one burst; the next burst starts from zero
    PerpetualBursts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Succeeded { attempt: u32 },
    Exhausted { attempts: u32 },
}

/// Attempt counter plus pacing state
#[derive(Debug, Clone)]
pub struct RetryBudget {
    attempts: u32,
    max_attempts: u32,
    interval: Duration,
    last_attempt_at: Option<u64>,
    mode: RetryMode,
}

impl RetryBudget {
    pub fn new(policy: RetryPolicy, mode: RetryMode) -> Self {
        Self {
            attempts: 0,
            max_attempts: policy.max_attempts,
            interval: policy.interval(),
            last_attempt_at: None,
            mode,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_attempt_at(&self) -> Option<u64> {
        self.last_attempt_at
    }

    pub fn mode(&self) -> RetryMode {
        self.mode
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// A ceiling budget that ran out stays out until `reset`
    pub fn has_given_up(&self) -> bool {
        self.mode == RetryMode::Ceiling && self.is_exhausted()
    }

    /// Start a fresh sequence: zero attempts, next attempt due immediately
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.last_attempt_at = None;
    }

    /// Zero the attempt count but keep pacing from the last attempt, so a
    /// sequence restarted after a success still waits one interval
    pub fn clear_attempts(&mut self) {
        self.attempts = 0;
    }

    /// Whether a full interval has passed since the last attempt
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_attempt_at {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval.as_millis() as u64,
        }
    }

    /// Count one attempt made at `now_ms`; returns its 1-based number
    pub fn record_attempt(&mut self, now_ms: u64) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt_at = Some(now_ms);
        self.attempts
    }

    /// Run consecutive attempts until one succeeds or the budget runs out,
    /// sleeping one interval between attempts (not after the last).
    ///
    /// The burst starts from a fresh budget, and a success resets it again.
    pub fn run_burst<C, F>(&mut self, clock: &C, mut attempt: F) -> RetryOutcome
    where
        C: Clock + ?Sized,
        F: FnMut(u32) -> bool,
    {
        self.reset();
        while !self.is_exhausted() {
            let number = self.record_attempt(clock.now_ms());
            if attempt(number) {
                self.reset();
                return RetryOutcome::Succeeded { attempt: number };
            }
            if !self.is_exhausted() {
                clock.sleep(self.interval);
            }
        }
        RetryOutcome::Exhausted {
            attempts: self.attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ManualClock;

    #[test]
    fn test_burst_stops_at_first_success() {
        let clock = ManualClock::new();
        let mut budget = RetryBudget::new(RetryPolicy::new(5, 1000), RetryMode::Ceiling);

        let mut calls = Vec::new();
        let outcome = budget.run_burst(&clock, |n| {
            calls.push(n);
            n == 3
        });

        assert_eq!(outcome, RetryOutcome::Succeeded { attempt: 3 });
        assert_eq!(calls, vec![1, 2, 3]);
        // Two pauses between three attempts
        assert_eq!(clock.now_ms(), 2000);
        assert_eq!(budget.attempts(), 0);
    }

    #[test]
    fn test_burst_exhaustion_does_not_sleep_after_last_attempt() {
        let clock = ManualClock::new();
        let mut budget = RetryBudget::new(RetryPolicy::new(3, 1000), RetryMode::PerpetualBursts);

        let outcome = budget.run_burst(&clock, |_| false);

        assert_eq!(outcome, RetryOutcome::Exhausted { attempts: 3 });
        assert_eq!(clock.now_ms(), 2000);
        assert!(!budget.has_given_up());
    }

    #[test]
    fn test_every_burst_starts_fresh() {
        let clock = ManualClock::new();
        let mut budget = RetryBudget::new(RetryPolicy::new(3, 10), RetryMode::PerpetualBursts);

        for _ in 0..4 {
            let mut calls = 0;
            budget.run_burst(&clock, |_| {
                calls += 1;
                false
            });
            assert_eq!(calls, 3);
        }
    }

    #[test]
    fn test_interval_gating_and_ceiling() {
        let mut budget = RetryBudget::new(RetryPolicy::new(2, 10_000), RetryMode::Ceiling);
        assert!(budget.is_due(0));

        assert_eq!(budget.record_attempt(0), 1);
        assert!(!budget.is_due(9_999));
        assert!(budget.is_due(10_000));

        budget.record_attempt(10_000);
        assert!(budget.has_given_up());

        budget.reset();
        assert!(!budget.has_given_up());
        assert!(budget.is_due(10_001));
    }

    #[test]
    fn test_clear_attempts_keeps_pacing() {
        let mut budget = RetryBudget::new(RetryPolicy::new(5, 10_000), RetryMode::Ceiling);
        budget.record_attempt(3_000);
        budget.record_attempt(13_000);

        budget.clear_attempts();
        assert_eq!(budget.attempts(), 0);
        assert_eq!(budget.last_attempt_at(), Some(13_000));
        assert!(!budget.is_due(22_999));
        assert!(budget.is_due(23_000));
    }
}
