//! Bounded polling until remote state satisfies a predicate

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::backoff::BackoffStrategy;

/// Polling policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of probe attempts
    pub max_attempts: u32,

    /// Delay between attempts (the base delay for non-fixed strategies)
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// One-off delay before the first attempt
    #[serde(with = "humantime_serde", default)]
    pub settle_delay: Duration,

    /// Backoff strategy
    #[serde(default)]
    pub backoff_strategy: BackoffStrategy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(10, Duration::from_secs(5))
    }
}

impl PollPolicy {
    /// Fixed-interval policy with no settle delay
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            settle_delay: Duration::ZERO,
            backoff_strategy: BackoffStrategy::Fixed,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_backoff(mut self, backoff_strategy: BackoffStrategy) -> Self {
        self.backoff_strategy = backoff_strategy;
        self
    }

    /// Delay to wait after a failed attempt (1-indexed); growing strategies
    /// stop at `interval * max_attempts`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let cap = self.interval.saturating_mul(self.max_attempts.max(1));
        self.backoff_strategy.delay(self.interval, attempt, cap)
    }

    /// Worst-case wall time spent sleeping before giving up
    pub fn budget(&self) -> Duration {
        (1..self.max_attempts).fold(self.settle_delay, |total, attempt| {
            total + self.delay_for_attempt(attempt)
        })
    }
}

/// Value that satisfied the predicate and the attempt that observed it
#[derive(Debug, Clone, PartialEq)]
pub struct PollSuccess<T> {
    pub value: T,
    pub attempt: u32,
}

/// Polling error types
#[derive(Debug, thiserror::Error)]
pub enum PollError<T, E> {
    /// Every attempt completed but none satisfied the predicate
    #[error("Condition not met after {attempts} attempts")]
    Exhausted { attempts: u32, last: Option<T> },

    /// The probe itself failed; polling stops immediately
    #[error("Probe failed on attempt {attempt}: {error}")]
    Probe { attempt: u32, error: E },
}

impl<T, E> PollError<T, E> {
    /// Last observed value if polling ran out of attempts
    pub fn last_observed(&self) -> Option<&T> {
        match self {
            PollError::Exhausted { last, .. } => last.as_ref(),
            PollError::Probe { .. } => None,
        }
    }
}

/// Poll executor
pub struct Poller {
    policy: PollPolicy,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Run `probe` until `predicate` accepts its value or attempts run out
    pub async fn poll_until<F, Fut, T, E, P>(
        &self,
        mut probe: F,
        predicate: P,
    ) -> Result<PollSuccess<T>, PollError<T, E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
        E: std::fmt::Display,
    {
        if !self.policy.settle_delay.is_zero() {
            debug!("Settling for {:?} before polling", self.policy.settle_delay);
            sleep(self.policy.settle_delay).await;
        }

        let mut last = None;
        for attempt in 1..=self.policy.max_attempts {
            debug!(
                "Poll attempt {} of {}",
                attempt, self.policy.max_attempts
            );

            let value = match probe(attempt).await {
                Ok(value) => value,
                Err(error) => {
                    warn!("Probe failed on attempt {}: {}", attempt, error);
                    return Err(PollError::Probe { attempt, error });
                }
            };

            if predicate(&value) {
                info!("Condition met on attempt {}", attempt);
                return Ok(PollSuccess { value, attempt });
            }
            last = Some(value);

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay_for_attempt(attempt);
                debug!("Condition not met, next attempt in {:?}", delay);
                sleep(delay).await;
            }
        }

        warn!(
            "Condition not met after {} attempts",
            self.policy.max_attempts
        );
        Err(PollError::Exhausted {
            attempts: self.policy.max_attempts,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn power_on_policy() -> PollPolicy {
        PollPolicy::fixed(10, Duration::from_secs(5)).with_settle_delay(Duration::from_secs(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_first_match() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let started = Instant::now();

        let result = Poller::new(power_on_policy())
            .poll_until(
                |attempt| {
                    calls_clone.fetch_add(1, Ordering::Relaxed);
                    async move {
                        Ok::<_, String>(if attempt >= 3 { "On" } else { "Off" })
                    }
                },
                |state| *state == "On",
            )
            .await
            .unwrap();

        assert_eq!(result.attempt, 3);
        assert_eq!(result.value, "On");
        assert_eq!(calls.load(Ordering::Relaxed), 3);
        // settle + two intervals
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_last_value() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let err = Poller::new(power_on_policy())
            .poll_until(
                |_| {
                    calls_clone.fetch_add(1, Ordering::Relaxed);
                    async { Ok::<_, String>("Off") }
                },
                |state| *state == "On",
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::Relaxed), 10);
        assert!(matches!(err, PollError::Exhausted { attempts: 10, .. }));
        assert_eq!(err.last_observed(), Some(&"Off"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_aborts() {
        let err = Poller::new(PollPolicy::fixed(8, Duration::from_secs(5)))
            .poll_until(
                |attempt| async move {
                    if attempt == 2 {
                        Err("connection reset".to_string())
                    } else {
                        Ok("Off")
                    }
                },
                |state| *state == "On",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Probe { attempt: 2, .. }));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_budget() {
        assert_eq!(power_on_policy().budget(), Duration::from_secs(55));
        assert_eq!(
            PollPolicy::fixed(1, Duration::from_secs(5)).budget(),
            Duration::ZERO
        );
        let linear = PollPolicy::fixed(4, Duration::from_secs(1)).with_backoff(BackoffStrategy::Linear);
        assert_eq!(linear.budget(), Duration::from_secs(6));
    }

    #[test]
    fn test_policy_from_yaml() {
        let policy: PollPolicy = serde_yaml::from_str(
            "max_attempts: 8\ninterval: 5s\nsettle_delay: 10s\n",
        )
        .unwrap();
        assert_eq!(policy.max_attempts, 8);
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.settle_delay, Duration::from_secs(10));
        assert_eq!(policy.backoff_strategy, BackoffStrategy::Fixed);
    }
}
