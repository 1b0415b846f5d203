//! Readiness gate: block until a dependency reports healthy.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::retry::RetryPolicy;

/// Why a single readiness check failed.
///
/// Transport errors, timeouts and bad statuses all collapse into "not yet
/// ready"; the message is only used for logging.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single readiness check against one dependency.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Human-readable target for log lines, e.g. a URL or a masked DSN.
    fn target(&self) -> String;

    /// Performs one check. `Ok` means the dependency is ready.
    async fn check(&self) -> Result<(), ProbeError>;
}

/// Terminal gate failure under a bounded retry policy.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GateError {
    #[error("Dependency not ready after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Polls a [`Probe`] until it succeeds or the retry budget runs out.
pub struct ReadinessGate {
    policy: RetryPolicy,
}

impl ReadinessGate {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Waits for the probe to report ready.
    ///
    /// Returns the number of attempts made. Under an unbounded policy this
    /// only ever returns `Ok`; under a bounded one it fails with
    /// [`GateError::Exhausted`] after exactly `max_attempts` checks.
    pub async fn wait(&self, probe: &dyn Probe) -> Result<u32, GateError> {
        let target = probe.target();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match probe.check().await {
                Ok(()) => {
                    info!(target = %target, attempt, "Dependency is ready");
                    return Ok(attempt);
                }
                Err(err) => {
                    if self.policy.is_exhausted(attempt) {
                        error!(
                            target = %target,
                            attempts = attempt,
                            error = %err,
                            "Dependency never became ready, giving up"
                        );
                        return Err(GateError::Exhausted { attempts: attempt });
                    }
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        target = %target,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Dependency not ready, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FlakyProbe {
        failures: u32,
        checks: AtomicU32,
    }

    impl FlakyProbe {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                checks: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Probe for FlakyProbe {
        fn target(&self) -> String {
            "http://localhost:9/healthz".to_string()
        }

        async fn check(&self) -> Result<(), ProbeError> {
            let seen = self.checks.fetch_add(1, Ordering::SeqCst);
            if seen < self.failures {
                Err(ProbeError::new("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::bounded(max_attempts, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn ready_on_first_attempt() {
        let gate = ReadinessGate::new(fast_policy(5));
        let probe = FlakyProbe::new(0);
        assert_eq!(gate.wait(&probe).await, Ok(1));
    }

    #[tokio::test]
    async fn recovers_within_budget() {
        let gate = ReadinessGate::new(fast_policy(5));
        let probe = FlakyProbe::new(3);
        assert_eq!(gate.wait(&probe).await, Ok(4));
        assert_eq!(probe.checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn exhausts_after_exactly_max_attempts() {
        let gate = ReadinessGate::new(fast_policy(3));
        let probe = FlakyProbe::new(u32::MAX);
        let err = gate.wait(&probe).await.unwrap_err();
        assert_eq!(err, GateError::Exhausted { attempts: 3 });
        assert_eq!(probe.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unbounded_policy_keeps_trying() {
        let gate = ReadinessGate::new(RetryPolicy::unbounded(Duration::from_millis(1)));
        let probe = FlakyProbe::new(20);
        assert_eq!(gate.wait(&probe).await, Ok(21));
    }
}
