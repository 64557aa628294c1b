//! Target BMC configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// The device under test and the credentials used against it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the BMC, e.g. `https://localhost:2443`
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: default_username(),
            password: default_password(),
        }
    }
}

impl TargetConfig {
    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Copy of this config with the password masked
    pub fn redacted(&self) -> Self {
        Self {
            password: "********".to_string(),
            ..self.clone()
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.url, "url", self.domain_name())?;
        validate_required_string(&self.username, "username", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_url() -> String {
    "https://localhost:2443".to_string()
}

fn default_username() -> String {
    "root".to_string()
}

fn default_password() -> String {
    "0penBmc".to_string()
}
