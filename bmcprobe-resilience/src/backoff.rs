//! How the wait between poll attempts grows

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Growth of the poll interval across attempts
///
/// Power transitions settle at a steady pace so suites use `Fixed`; the
/// growing variants suit probes against a BMC that is still booting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackoffStrategy {
    #[default]
    Fixed,

    /// `interval * attempt`
    Linear,

    /// `interval * factor^(attempt - 1)`
    Exponential { factor: f64 },
}

impl BackoffStrategy {
    /// Wait after failed `attempt` (1-indexed), never above `cap`
    pub fn delay(&self, interval: Duration, attempt: u32, cap: Duration) -> Duration {
        let attempt = attempt.max(1);
        let raw = match *self {
            BackoffStrategy::Fixed => interval,
            BackoffStrategy::Linear => interval.saturating_mul(attempt),
            BackoffStrategy::Exponential { factor } => {
                let scale = factor.max(1.0).powi(attempt as i32 - 1);
                Duration::try_from_secs_f64(interval.as_secs_f64() * scale).unwrap_or(cap)
            }
        };
        raw.min(cap)
    }
}
