//! IPMI tool adapter
//!
//! The cross-check shells out to `ipmitool sensor list` and keeps the
//! temperature lines of its pipe-separated table:
//!
//! ```text
//! CPU Temp         | 45.000     | degrees C  | ok    | na | ...
//! ```

use async_trait::async_trait;
use bmcprobe_config::IpmiConfig;
use bmcprobe_core::SensorReading;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Substrings that mark a line as temperature related
const TEMPERATURE_KEYWORDS: &[&str] = &["temp", "cpu", "core", "dimm"];

static FIELD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\|\s*").expect("valid separator regex"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number regex"));

#[derive(Debug, Error)]
pub enum IpmiError {
    #[error("IPMI tool not installed: {0}")]
    NotInstalled(String),

    #[error("IPMI tool exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("IPMI tool timed out after {0:?}")]
    Timeout(Duration),

    #[error("IPMI tool I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of raw `sensor list` output
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IpmiTool: Send + Sync {
    async fn sensor_list(&self) -> Result<String, IpmiError>;
}

/// Runs the IPMI tool as a child process
#[derive(Debug, Clone)]
pub struct IpmitoolCommand {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl IpmitoolCommand {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }
}

impl From<&IpmiConfig> for IpmitoolCommand {
    fn from(config: &IpmiConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone(), config.timeout)
    }
}

#[async_trait]
impl IpmiTool for IpmitoolCommand {
    async fn sensor_list(&self) -> Result<String, IpmiError> {
        debug!("Running {} {}", self.command, self.args.join(" "));

        let mut command = Command::new(&self.command);
        command.args(&self.args).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => return Err(IpmiError::Timeout(self.timeout)),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(IpmiError::NotInstalled(self.command.clone()))
            }
            Ok(result) => result?,
        };

        if !output.status.success() {
            return Err(IpmiError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Temperature readings in output order
///
/// A line is kept when it mentions one of the temperature keywords, splits into
/// at least three fields, has a number in the value field and a Celsius unit.
/// A label seen twice keeps its first position and its last value.
pub fn parse_sensor_list(output: &str) -> Vec<SensorReading> {
    let mut readings: Vec<SensorReading> = Vec::new();

    for line in output.lines() {
        let lower = line.to_lowercase();
        if !TEMPERATURE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            continue;
        }

        let fields: Vec<&str> = FIELD_SEPARATOR.split(line.trim()).collect();
        if fields.len() < 3 {
            continue;
        }

        let name = fields[0].trim();
        if !is_celsius(fields[2]) {
            continue;
        }
        let Some(celsius) = NUMBER
            .find(fields[1])
            .and_then(|m| m.as_str().parse::<f64>().ok())
        else {
            continue;
        };

        match readings.iter_mut().find(|reading| reading.name == name) {
            Some(existing) => existing.celsius = celsius,
            None => readings.push(SensorReading::new(name, celsius)),
        }
    }

    info!("Parsed {} IPMI temperature readings", readings.len());
    readings
}

fn is_celsius(unit: &str) -> bool {
    unit.trim().eq_ignore_ascii_case("degrees c")
}
