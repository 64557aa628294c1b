//! Suite settings derived from the loaded configuration

use bmcprobe_config::{AuthMode, ProbeConfig};
use bmcprobe_core::MatchPolicy;

use crate::cases::CaseId;
use crate::error::{RedfishError, Result};
use crate::power::PowerPolicies;

/// Everything the cases need besides the API and IPMI handles
#[derive(Debug, Clone)]
pub struct SuiteSettings {
    pub username: String,
    pub password: String,
    pub system_path: String,
    pub thermal_path: String,
    pub thermal_fallback_path: String,
    pub power: PowerPolicies,
    pub match_policy: MatchPolicy,
    pub auth_mode: AuthMode,
    /// Cases to run, in execution order
    pub cases: Vec<CaseId>,
    pub fail_fast: bool,
}

impl SuiteSettings {
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            username: config.target.username.clone(),
            password: config.target.password.clone(),
            system_path: config.redfish.system_path.clone(),
            thermal_path: config.redfish.thermal_path.clone(),
            thermal_fallback_path: config.redfish.thermal_fallback_path.clone(),
            power: PowerPolicies::from(&config.power),
            match_policy: MatchPolicy {
                similarity_threshold: config.sensors.similarity_threshold,
                tolerance_celsius: config.sensors.tolerance_celsius,
                min_match_ratio: config.sensors.min_match_ratio,
            },
            auth_mode: config.redfish.auth_mode,
            cases: select_cases(&config.redfish.cases)?,
            fail_fast: config.redfish.fail_fast,
        })
    }
}

/// Named cases in declared order; an empty filter selects every case
pub fn select_cases(names: &[String]) -> Result<Vec<CaseId>> {
    let requested = names
        .iter()
        .map(|name| {
            name.parse::<CaseId>()
                .map_err(|_| RedfishError::UnknownCase(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CaseId::ALL
        .iter()
        .copied()
        .filter(|case| requested.is_empty() || requested.contains(case))
        .collect())
}
