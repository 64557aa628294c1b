//! UI suite settings derived from the loaded configuration

use bmcprobe_config::domains::webui::{FailurePolicy, UiTimings};
use bmcprobe_config::ProbeConfig;

#[derive(Debug, Clone)]
pub struct UiSettings {
    pub username: String,
    pub password: String,
    /// Tried in order during discovery
    pub candidate_urls: Vec<String>,
    pub timings: UiTimings,
    pub invalid_username: String,
    pub wrong_password: String,
    pub lockout_attempts: u32,
    pub failure_policy: FailurePolicy,
}

impl UiSettings {
    pub fn from_config(config: &ProbeConfig) -> Self {
        let webui = &config.webui;
        Self {
            username: config.target.username.clone(),
            password: config.target.password.clone(),
            candidate_urls: webui.candidate_urls(config.target.base_url()),
            timings: webui.timings.clone(),
            invalid_username: webui.invalid_username.clone(),
            wrong_password: webui.wrong_password.clone(),
            lockout_attempts: webui.lockout_attempts,
            failure_policy: webui.failure_policy,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}
