//! Errors raised while loading or validating settings

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A `BMCPROBE_*` or `OPENBMC_*` variable could not be parsed
    #[error("Bad environment override: {0}")]
    EnvError(String),

    /// A domain failed validation
    #[error("Invalid {domain} settings: {message}")]
    DomainError { domain: String, message: String },
}

impl ConfigError {
    pub fn domain(domain: &str, message: impl Into<String>) -> Self {
        ConfigError::DomainError {
            domain: domain.to_string(),
            message: message.into(),
        }
    }
}
