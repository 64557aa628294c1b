//! Load profile configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_range, validate_ratio, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest run, and longest ramp-up, a load run may be configured for
pub const MAX_RUN_TIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Load run shape and the two user profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Total simulated users across enabled profiles
    #[serde(default = "default_users")]
    pub users: usize,

    /// Users started per second
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_run_time"
    )]
    pub run_time: Duration,

    /// Fail the run when the overall failure rate exceeds this fraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_failure_rate: Option<f64>,

    /// Write the final results as JSON to this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,

    #[serde(default)]
    pub bmc: BmcProfileConfig,

    #[serde(default)]
    pub public_api: PublicApiProfileConfig,
}

/// Weights and think time for the BMC user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BmcProfileConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_bmc_min_wait"
    )]
    pub min_wait: Duration,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_bmc_max_wait"
    )]
    pub max_wait: Duration,

    #[serde(default = "default_system_info_weight")]
    pub system_info_weight: u32,

    #[serde(default = "default_power_state_weight")]
    pub power_state_weight: u32,
}

/// Weights, hosts and think time for the public API user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicApiProfileConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    #[serde(default = "default_public_host")]
    pub host: String,

    /// Absolute URL, independent of `host`
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_public_min_wait"
    )]
    pub min_wait: Duration,

    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_public_max_wait"
    )]
    pub max_wait: Duration,

    #[serde(default = "default_posts_weight")]
    pub posts_weight: u32,

    #[serde(default = "default_weather_weight")]
    pub weather_weight: u32,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            spawn_rate: default_spawn_rate(),
            run_time: default_run_time(),
            max_failure_rate: None,
            report_path: None,
            bmc: BmcProfileConfig::default(),
            public_api: PublicApiProfileConfig::default(),
        }
    }
}

impl Default for BmcProfileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_wait: default_bmc_min_wait(),
            max_wait: default_bmc_max_wait(),
            system_info_weight: default_system_info_weight(),
            power_state_weight: default_power_state_weight(),
        }
    }
}

impl Default for PublicApiProfileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_public_host(),
            weather_url: default_weather_url(),
            min_wait: default_public_min_wait(),
            max_wait: default_public_max_wait(),
            posts_weight: default_posts_weight(),
            weather_weight: default_weather_weight(),
        }
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.users, "users", self.domain_name())?;
        validate_positive(self.spawn_rate, "spawn_rate", self.domain_name())?;
        validate_positive(self.run_time.as_secs(), "run_time", self.domain_name())?;
        validate_range(self.run_time, MAX_RUN_TIME, "run_time", self.domain_name())?;

        let ramp_up_secs = self.users as f64 / self.spawn_rate;
        if ramp_up_secs > MAX_RUN_TIME.as_secs_f64() {
            return Err(self.validation_error(format!(
                "{} users at spawn_rate {} take {:.0}s to start, limit is {}s",
                self.users,
                self.spawn_rate,
                ramp_up_secs,
                MAX_RUN_TIME.as_secs()
            )));
        }

        if let Some(rate) = self.max_failure_rate {
            validate_ratio(rate, "max_failure_rate", self.domain_name())?;
        }

        if !self.bmc.enabled && !self.public_api.enabled {
            return Err(self.validation_error("At least one load profile must be enabled"));
        }

        self.bmc.validate()?;
        self.public_api.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

impl Validatable for BmcProfileConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(self.min_wait, self.max_wait, "wait", self.domain_name())?;
        if self.enabled && self.system_info_weight + self.power_state_weight == 0 {
            return Err(self.validation_error("At least one task needs a non-zero weight"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load.bmc"
    }
}

impl Validatable for PublicApiProfileConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(self.min_wait, self.max_wait, "wait", self.domain_name())?;
        if self.enabled {
            validate_url(&self.host, "host", self.domain_name())?;
            validate_url(&self.weather_url, "weather_url", self.domain_name())?;
            if self.posts_weight + self.weather_weight == 0 {
                return Err(self.validation_error("At least one task needs a non-zero weight"));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load.public_api"
    }
}

fn default_users() -> usize {
    10
}

fn default_spawn_rate() -> f64 {
    1.0
}

fn default_run_time() -> Duration {
    Duration::from_secs(60)
}

fn default_bmc_min_wait() -> Duration {
    Duration::from_secs(1)
}

fn default_bmc_max_wait() -> Duration {
    Duration::from_secs(3)
}

fn default_system_info_weight() -> u32 {
    3
}

fn default_power_state_weight() -> u32 {
    2
}

fn default_public_host() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

fn default_weather_url() -> String {
    "https://wttr.in/Novosibirsk?format=j1".to_string()
}

fn default_public_min_wait() -> Duration {
    Duration::from_secs(1)
}

fn default_public_max_wait() -> Duration {
    Duration::from_secs(5)
}

fn default_posts_weight() -> u32 {
    4
}

fn default_weather_weight() -> u32 {
    1
}
