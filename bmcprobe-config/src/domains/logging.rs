//! Console and file logging

use crate::domains::utils::{default_false, default_true};
use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP stack crates that get very chatty at debug level during load runs
const TRANSPORT_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,

    pub format: LogFormat,

    /// Mirror console output into this file, without ANSI colors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default = "default_false")]
    pub include_location: bool,

    /// Cap the HTTP stack at `warn` whatever `level` says
    #[serde(default = "default_true")]
    pub quiet_transport: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file: None,
            include_location: false,
            quiet_transport: true,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive for this configuration, e.g. `debug,hyper=warn`
    pub fn filter_directive(&self) -> String {
        let mut directive = self.level.to_string();
        if self.quiet_transport && self.level > LogLevel::Warn {
            for target in TRANSPORT_TARGETS {
                directive.push_str(&format!(",{}=warn", target));
            }
        }
        directive
    }
}

/// Ordered from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const NAMES: [(LogLevel, &'static str); 5] = [
        (LogLevel::Error, "error"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Info, "info"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Trace, "trace"),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(level, _)| level == self)
            .map(|(_, name)| *name)
            .unwrap_or("info")
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = if wanted == "warning" { "warn".to_string() } else { wanted };
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(level, _)| *level)
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for CI log collectors
    Json,
    #[default]
    Text,
    Compact,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "full" => Ok(LogFormat::Text),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

impl Validatable for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        match &self.file {
            Some(path) => validate_required_string(path, "file", self.domain_name()),
            None => Ok(()),
        }
    }

    fn domain_name(&self) -> &'static str {
        "logging"
    }
}
