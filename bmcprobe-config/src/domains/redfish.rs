//! Redfish suite configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the suite authenticates its requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// HTTP basic auth on every request
    #[default]
    Basic,
    /// One session created up front, token attached to every request
    Session,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(AuthMode::Basic),
            "session" => Ok(AuthMode::Session),
            _ => Err(format!("Invalid auth mode: {}", s)),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Basic => write!(f, "basic"),
            AuthMode::Session => write!(f, "session"),
        }
    }
}

/// Redfish resource paths and suite behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedfishConfig {
    #[serde(default)]
    pub auth_mode: AuthMode,

    #[serde(default = "default_system_path")]
    pub system_path: String,

    /// Thermal resource, tried first
    #[serde(default = "default_thermal_path")]
    pub thermal_path: String,

    /// Tried once when the primary thermal path answers 404
    #[serde(default = "default_thermal_fallback_path")]
    pub thermal_fallback_path: String,

    /// Restrict the run to these case names; empty runs every case
    #[serde(default)]
    pub cases: Vec<String>,

    /// Stop after the first failed case
    #[serde(default = "crate::domains::utils::default_false")]
    pub fail_fast: bool,
}

impl Default for RedfishConfig {
    fn default() -> Self {
        Self {
            auth_mode: AuthMode::Basic,
            system_path: default_system_path(),
            thermal_path: default_thermal_path(),
            thermal_fallback_path: default_thermal_fallback_path(),
            cases: Vec::new(),
            fail_fast: false,
        }
    }
}

impl Validatable for RedfishConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (path, name) in [
            (&self.system_path, "system_path"),
            (&self.thermal_path, "thermal_path"),
            (&self.thermal_fallback_path, "thermal_fallback_path"),
        ] {
            validate_required_string(path, name, self.domain_name())?;
            if !path.starts_with('/') {
                return Err(self.validation_error(format!("{} must start with '/'", name)));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "redfish"
    }
}

fn default_system_path() -> String {
    "/redfish/v1/Systems/system".to_string()
}

fn default_thermal_path() -> String {
    "/redfish/v1/Chassis/chassis/Thermal".to_string()
}

fn default_thermal_fallback_path() -> String {
    "/redfish/v1/Chassis/1/Thermal".to_string()
}
