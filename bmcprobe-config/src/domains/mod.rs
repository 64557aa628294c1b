//! Per-concern settings sections

pub mod http;
pub mod load;
pub mod logging;
pub mod power;
pub mod redfish;
pub mod sensors;
pub mod target;
pub mod utils;
pub mod webui;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Everything a run needs; missing sections take their defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProbeConfig {
    /// BMC under test and its credentials
    pub target: target::TargetConfig,

    pub http: http::HttpConfig,

    pub redfish: redfish::RedfishConfig,

    /// Reset polling
    pub power: power::PowerConfig,

    /// Redfish/IPMI cross-check
    pub sensors: sensors::SensorsConfig,

    pub webui: webui::WebUiConfig,

    pub load: load::LoadConfig,

    pub logging: logging::LoggingConfig,
}

impl ProbeConfig {
    /// First failing section wins, in file order
    pub fn validate_all(&self) -> ConfigResult<()> {
        let sections: [&dyn Validatable; 8] = [
            &self.target,
            &self.http,
            &self.redfish,
            &self.power,
            &self.sensors,
            &self.webui,
            &self.load,
            &self.logging,
        ];
        sections.iter().try_for_each(|section| section.validate())
    }

    /// Copy safe to print: credentials masked
    pub fn redacted(&self) -> Self {
        Self {
            target: self.target.redacted(),
            ..self.clone()
        }
    }

    /// Defaults rendered as YAML, for `config generate`
    pub fn generate_sample() -> String {
        match serde_yaml::to_string(&ProbeConfig::default()) {
            Ok(yaml) => format!("# bmcprobe sample configuration\n{}", yaml),
            Err(e) => format!("# sample could not be rendered: {}\n", e),
        }
    }
}
