//! Power transition polling configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Budgets for verifying a power transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Wait after the reset is accepted, before the first poll
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_settle_delay"
    )]
    pub settle_delay: Duration,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_poll_interval"
    )]
    pub poll_interval: Duration,

    #[serde(default = "default_power_on_attempts")]
    pub power_on_attempts: u32,

    #[serde(default = "default_power_off_attempts")]
    pub power_off_attempts: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            settle_delay: default_settle_delay(),
            poll_interval: default_poll_interval(),
            power_on_attempts: default_power_on_attempts(),
            power_off_attempts: default_power_off_attempts(),
        }
    }
}

impl Validatable for PowerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.power_on_attempts, "power_on_attempts", self.domain_name())?;
        validate_positive(self.power_off_attempts, "power_off_attempts", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "power"
    }
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_power_on_attempts() -> u32 {
    10
}

fn default_power_off_attempts() -> u32 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_defaults() {
        let config = PowerConfig::default();
        assert_eq!(config.settle_delay, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.power_on_attempts, 10);
        assert_eq!(config.power_off_attempts, 8);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = PowerConfig {
            power_off_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
