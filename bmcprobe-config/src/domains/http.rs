//! Client settings shared by the Redfish suite, the load runner and the
//! WebDriver client

use crate::domains::utils::{default_false, serde_duration};
use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_range, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request deadline, body included
    #[serde(with = "serde_duration")]
    pub timeout: Duration,

    #[serde(with = "serde_duration")]
    pub connect_timeout: Duration,

    pub max_redirects: u32,

    pub user_agent: String,

    /// Off by default since BMCs ship self-signed certificates
    #[serde(default = "default_false")]
    pub verify_ssl: bool,

    /// Idle keep-alive connections kept per host; load runs with many
    /// simulated users want this above the user count
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            user_agent: format!("bmcprobe/{}", env!("CARGO_PKG_VERSION")),
            verify_ssl: false,
            pool_max_idle_per_host: 64,
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        let domain = self.domain_name();
        validate_positive(self.timeout.as_millis(), "timeout", domain)?;
        validate_positive(self.connect_timeout.as_millis(), "connect_timeout", domain)?;
        validate_range(self.connect_timeout, self.timeout, "connect_timeout..timeout", domain)?;
        validate_required_string(&self.user_agent, "user_agent", domain)
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}
