//! File, environment and validation, in that order

use crate::domains::ProbeConfig;
use crate::error::{ConfigError, ConfigResult};
use log::debug;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::utils::parse_duration;

/// Unprefixed variables understood for compatibility with existing OpenBMC scripts
const LEGACY_URL: &str = "OPENBMC_URL";
const LEGACY_USERNAME: &str = "OPENBMC_USERNAME";
const LEGACY_PASSWORD: &str = "OPENBMC_PASSWORD";

/// Reads settings and overlays `<prefix>_*` variables (`BMCPROBE_` by default)
pub struct ConfigLoader {
    prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            prefix: "BMCPROBE".to_string(),
        }
    }

    /// Loader for another prefix, mostly for tests that must not see a
    /// developer's own `BMCPROBE_*` variables
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<ProbeConfig> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ProbeConfig = serde_yaml::from_str(&content)?;
        self.finish(config)
    }

    /// Defaults plus environment
    pub fn from_env(&self) -> ConfigResult<ProbeConfig> {
        self.finish(ProbeConfig::default())
    }

    fn finish(&self, mut config: ProbeConfig) -> ConfigResult<ProbeConfig> {
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut ProbeConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_redfish_overrides(&mut config.redfish)?;
        self.apply_power_overrides(&mut config.power)?;
        self.apply_sensors_overrides(&mut config.sensors)?;
        self.apply_webui_overrides(&mut config.webui)?;
        self.apply_load_overrides(&mut config.load)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply target overrides; prefixed variables win over the legacy ones
    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = std::env::var(LEGACY_URL) {
            config.url = url;
        }
        if let Ok(username) = std::env::var(LEGACY_USERNAME) {
            config.username = username;
        }
        if let Ok(password) = std::env::var(LEGACY_PASSWORD) {
            config.password = password;
        }

        if let Ok(url) = self.get_env_var("TARGET_URL") {
            config.url = url;
        }
        if let Ok(username) = self.get_env_var("TARGET_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = self.get_env_var("TARGET_PASSWORD") {
            config.password = password;
        }

        Ok(())
    }

    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Some(timeout) = self.parse_duration_var("HTTP_TIMEOUT")? {
            config.timeout = timeout;
        }
        if let Some(timeout) = self.parse_duration_var("HTTP_CONNECT_TIMEOUT")? {
            config.connect_timeout = timeout;
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Some(verify_ssl) = self.parse_var("HTTP_VERIFY_SSL")? {
            config.verify_ssl = verify_ssl;
        }

        Ok(())
    }

    fn apply_redfish_overrides(
        &self,
        config: &mut crate::domains::redfish::RedfishConfig,
    ) -> ConfigResult<()> {
        if let Some(mode) = self.parse_var("REDFISH_AUTH_MODE")? {
            config.auth_mode = mode;
        }

        if let Ok(cases) = self.get_env_var("REDFISH_CASES") {
            config.cases = cases
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    fn apply_power_overrides(
        &self,
        config: &mut crate::domains::power::PowerConfig,
    ) -> ConfigResult<()> {
        if let Some(delay) = self.parse_duration_var("POWER_SETTLE_DELAY")? {
            config.settle_delay = delay;
        }
        if let Some(interval) = self.parse_duration_var("POWER_POLL_INTERVAL")? {
            config.poll_interval = interval;
        }
        if let Some(attempts) = self.parse_var("POWER_ON_ATTEMPTS")? {
            config.power_on_attempts = attempts;
        }
        if let Some(attempts) = self.parse_var("POWER_OFF_ATTEMPTS")? {
            config.power_off_attempts = attempts;
        }
        Ok(())
    }

    fn apply_sensors_overrides(
        &self,
        config: &mut crate::domains::sensors::SensorsConfig,
    ) -> ConfigResult<()> {
        if let Ok(command) = self.get_env_var("IPMI_COMMAND") {
            config.ipmi.command = command;
        }
        if let Some(timeout) = self.parse_duration_var("IPMI_TIMEOUT")? {
            config.ipmi.timeout = timeout;
        }
        if let Some(tolerance) = self.parse_var("SENSOR_TOLERANCE")? {
            config.tolerance_celsius = tolerance;
        }
        Ok(())
    }

    fn apply_webui_overrides(
        &self,
        config: &mut crate::domains::webui::WebUiConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("WEBDRIVER_URL") {
            config.webdriver_url = url;
        }
        if let Ok(binary) = self.get_env_var("BROWSER_BINARY") {
            config.browser.binary = binary;
        }
        if let Some(headless) = self.parse_var("BROWSER_HEADLESS")? {
            config.browser.headless = headless;
        }
        Ok(())
    }

    fn apply_load_overrides(
        &self,
        config: &mut crate::domains::load::LoadConfig,
    ) -> ConfigResult<()> {
        if let Some(users) = self.parse_var("LOAD_USERS")? {
            config.users = users;
        }
        if let Some(rate) = self.parse_var("LOAD_SPAWN_RATE")? {
            config.spawn_rate = rate;
        }
        if let Some(run_time) = self.parse_duration_var("LOAD_RUN_TIME")? {
            config.run_time = run_time;
        }
        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Some(level) = self.parse_var("LOG_LEVEL")? {
            config.level = level;
        }

        if let Some(format) = self.parse_var("LOG_FORMAT")? {
            config.format = format;
        }

        if let Ok(file) = self.get_env_var("LOG_FILE") {
            config.file = Some(file);
        }

        if let Some(quiet) = self.parse_var("LOG_QUIET_TRANSPORT")? {
            config.quiet_transport = quiet;
        }

        Ok(())
    }

    /// Parse a prefixed variable if it is set
    fn parse_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            Err(_) => Ok(None),
        }
    }

    /// Whole seconds or a humantime duration such as `500ms`
    fn parse_duration_var(&self, name: &str) -> ConfigResult<Option<Duration>> {
        match self.get_env_var(name) {
            Ok(raw) => parse_duration(&raw)
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            Err(_) => Ok(None),
        }
    }

    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
