//! Browser UI suite configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What the UI runner does with a failed case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failure ends the run and becomes the command error
    FailFast,
    /// Every case runs; failures are counted in the summary
    #[default]
    Tally,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(FailurePolicy::FailFast),
            "tally" => Ok(FailurePolicy::Tally),
            _ => Err(format!("Invalid failure policy: {}", s)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::Tally => write!(f, "tally"),
        }
    }
}

/// WebDriver endpoint, browser and UI case settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebUiConfig {
    /// WebDriver server the harness talks to
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Candidate UI base URLs; empty means the target URL
    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timings: UiTimings,

    /// Username used by the wrong-username case
    #[serde(default = "default_invalid_username")]
    pub invalid_username: String,

    /// Password used by the wrong-password case
    #[serde(default = "default_wrong_password")]
    pub wrong_password: String,

    /// Failed logins attempted before the lockout case logs in correctly
    #[serde(default = "default_lockout_attempts")]
    pub lockout_attempts: u32,
}

/// Local WebDriver server process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Spawn the driver binary instead of using an already running server
    #[serde(default = "crate::domains::utils::default_false")]
    pub spawn: bool,

    #[serde(default = "default_driver_path")]
    pub path: String,

    #[serde(default = "default_driver_port")]
    pub port: u16,

    /// How long to wait for a spawned driver to answer `/status`
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_startup_timeout"
    )]
    pub startup_timeout: Duration,
}

/// Browser capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    #[serde(default = "default_browser_binary")]
    pub binary: String,

    #[serde(default = "crate::domains::utils::default_true")]
    pub headless: bool,

    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,
}

/// Fixed waits used by the UI cases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiTimings {
    /// After navigating during discovery and page checks
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_page_load"
    )]
    pub page_load: Duration,

    /// After submitting valid credentials
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_login_settle"
    )]
    pub login_settle: Duration,

    /// After submitting invalid credentials
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_rejected_settle"
    )]
    pub rejected_settle: Duration,

    /// Upper bound when waiting for an element to appear
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_element_wait"
    )]
    pub element_wait: Duration,
}

impl Default for WebUiConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            urls: Vec::new(),
            failure_policy: FailurePolicy::Tally,
            driver: DriverConfig::default(),
            browser: BrowserConfig::default(),
            timings: UiTimings::default(),
            invalid_username: default_invalid_username(),
            wrong_password: default_wrong_password(),
            lockout_attempts: default_lockout_attempts(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            spawn: false,
            path: default_driver_path(),
            port: default_driver_port(),
            startup_timeout: default_startup_timeout(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: default_browser_binary(),
            headless: true,
            args: default_browser_args(),
        }
    }
}

impl Default for UiTimings {
    fn default() -> Self {
        Self {
            page_load: default_page_load(),
            login_settle: default_login_settle(),
            rejected_settle: default_rejected_settle(),
            element_wait: default_element_wait(),
        }
    }
}

impl WebUiConfig {
    /// Candidate UI URLs, falling back to `target_url`
    pub fn candidate_urls(&self, target_url: &str) -> Vec<String> {
        if self.urls.is_empty() {
            vec![target_url.trim_end_matches('/').to_string()]
        } else {
            self.urls
                .iter()
                .map(|url| url.trim_end_matches('/').to_string())
                .collect()
        }
    }
}

impl Validatable for WebUiConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.webdriver_url, "webdriver_url", self.domain_name())?;
        for url in &self.urls {
            validate_url(url, "urls", self.domain_name())?;
        }
        validate_required_string(&self.invalid_username, "invalid_username", self.domain_name())?;
        validate_required_string(&self.wrong_password, "wrong_password", self.domain_name())?;
        validate_positive(self.lockout_attempts, "lockout_attempts", self.domain_name())?;
        self.driver.validate()?;
        self.browser.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "webui"
    }
}

impl Validatable for DriverConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.spawn {
            validate_required_string(&self.path, "path", self.domain_name())?;
            validate_positive(self.port, "port", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "webui.driver"
    }
}

impl Validatable for BrowserConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.binary, "binary", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "webui.browser"
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_driver_path() -> String {
    "/usr/bin/chromedriver".to_string()
}

fn default_driver_port() -> u16 {
    9515
}

fn default_startup_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_browser_binary() -> String {
    "/usr/bin/chromium-browser".to_string()
}

fn default_browser_args() -> Vec<String> {
    [
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--ignore-certificate-errors",
        "--ignore-ssl-errors",
        "--allow-insecure-localhost",
        "--disable-web-security",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

fn default_invalid_username() -> String {
    "invalid_user".to_string()
}

fn default_wrong_password() -> String {
    "wrong_password".to_string()
}

fn default_lockout_attempts() -> u32 {
    3
}

fn default_page_load() -> Duration {
    Duration::from_secs(3)
}

fn default_login_settle() -> Duration {
    Duration::from_secs(5)
}

fn default_rejected_settle() -> Duration {
    Duration::from_secs(3)
}

fn default_element_wait() -> Duration {
    Duration::from_secs(5)
}
