//! Retry policy shared by the readiness gate and database probes.

use std::time::Duration;

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every attempt.
    Fixed(Duration),
    /// Delay doubles after each attempt, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

/// How often and how long to retry a failing check.
///
/// Two shapes cover the deployment patterns this tool supports: an init
/// container retries a bounded number of times and lets the supervisor
/// restart it, while a sidecar with no fallback waits forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Give up after this many attempts; `None` retries forever.
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Retry forever with a fixed interval.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            max_attempts: None,
            backoff: Backoff::Fixed(interval),
        }
    }

    /// Retry at most `max_attempts` times with capped exponential backoff.
    pub fn bounded(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            backoff: Backoff::Exponential { initial, max },
        }
    }

    /// Delay to sleep after the given 1-based attempt has failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(interval) => interval,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                initial.saturating_mul(factor).min(max)
            }
        }
    }

    /// True once `attempts_made` has consumed the whole budget.
    pub fn is_exhausted(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made >= max,
            None => false,
        }
    }
}
