//! Sensor cross-check configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_ratio, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Redfish/IPMI matching thresholds and the IPMI tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Pairs need a label similarity strictly above this
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Allowed absolute difference in °C, inclusive
    #[serde(default = "default_tolerance_celsius")]
    pub tolerance_celsius: f64,

    /// Fraction of compared pairs that must agree
    #[serde(default = "default_min_match_ratio")]
    pub min_match_ratio: f64,

    #[serde(default)]
    pub ipmi: IpmiConfig,
}

/// External IPMI tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpmiConfig {
    #[serde(default = "default_ipmi_command")]
    pub command: String,

    #[serde(default = "default_ipmi_args")]
    pub args: Vec<String>,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_ipmi_timeout"
    )]
    pub timeout: Duration,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            tolerance_celsius: default_tolerance_celsius(),
            min_match_ratio: default_min_match_ratio(),
            ipmi: IpmiConfig::default(),
        }
    }
}

impl Default for IpmiConfig {
    fn default() -> Self {
        Self {
            command: default_ipmi_command(),
            args: default_ipmi_args(),
            timeout: default_ipmi_timeout(),
        }
    }
}

impl Validatable for SensorsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_ratio(
            self.similarity_threshold,
            "similarity_threshold",
            self.domain_name(),
        )?;
        validate_positive(self.tolerance_celsius, "tolerance_celsius", self.domain_name())?;
        validate_ratio(self.min_match_ratio, "min_match_ratio", self.domain_name())?;
        self.ipmi.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sensors"
    }
}

impl Validatable for IpmiConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.command, "command", self.domain_name())?;
        validate_positive(self.timeout.as_secs(), "timeout", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sensors.ipmi"
    }
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_tolerance_celsius() -> f64 {
    5.0
}

fn default_min_match_ratio() -> f64 {
    0.7
}

fn default_ipmi_command() -> String {
    "ipmitool".to_string()
}

fn default_ipmi_args() -> Vec<String> {
    vec!["sensor".to_string(), "list".to_string()]
}

fn default_ipmi_timeout() -> Duration {
    Duration::from_secs(30)
}
