//! Power states and reset actions

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Terminal power state reported by `ComputerSystem.PowerState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::On => "On",
            PowerState::Off => "Off",
        }
    }

    /// The reset action that drives the system into this state
    pub fn reset_type(&self) -> ResetType {
        match self {
            PowerState::On => ResetType::ForceOn,
            PowerState::Off => ResetType::ForceOff,
        }
    }

    /// Whether a raw `PowerState` value reports this state; transitional
    /// values such as `PoweringOn` match neither
    pub fn matches(&self, reported: Option<&str>) -> bool {
        reported.and_then(|raw| raw.parse::<PowerState>().ok()) == Some(*self)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Redfish enum values are case-sensitive, so `on` is not `On`
impl FromStr for PowerState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On" => Ok(PowerState::On),
            "Off" => Ok(PowerState::Off),
            _ => Err(CoreError::UnknownPowerState(s.to_string())),
        }
    }
}

/// `ResetType` parameter of the `ComputerSystem.Reset` action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetType {
    ForceOn,
    ForceOff,
}

impl ResetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetType::ForceOn => "ForceOn",
            ResetType::ForceOff => "ForceOff",
        }
    }

    /// Request body for the reset action
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({ "ResetType": self.as_str() })
    }
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
