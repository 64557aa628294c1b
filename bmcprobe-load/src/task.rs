//! Load tasks and their response validators

use bmcprobe_core::PowerState;
use serde_json::Value;

/// Where a task sends its request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTarget {
    /// Relative to the profile host
    Path(String),
    /// Absolute URL, the profile host is ignored
    Url(String),
}

impl TaskTarget {
    pub fn resolve(&self, host: &str) -> String {
        match self {
            TaskTarget::Path(path) => format!("{}{}", host.trim_end_matches('/'), path),
            TaskTarget::Url(url) => url.clone(),
        }
    }
}

/// Minimal shape check applied to a `200` response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Object carrying `Id` and `Name`
    SystemInfo,
    /// Object whose `PowerState` is `On` or `Off`
    PowerState,
    /// Non-empty JSON array
    PostsList,
    /// Object carrying `current_condition`
    WeatherData,
}

impl Validator {
    /// `Err` holds the failure reason recorded for the sample
    pub fn check(&self, status: u16, body: &str) -> Result<(), String> {
        if status != 200 {
            return Err(format!("Status code: {}", status));
        }

        let json: Value =
            serde_json::from_str(body).map_err(|_| "Invalid JSON response".to_string())?;

        match self {
            Validator::SystemInfo => {
                if json.get("Id").is_some() && json.get("Name").is_some() {
                    Ok(())
                } else {
                    Err("Invalid response format".to_string())
                }
            }
            Validator::PowerState => {
                let object = json
                    .as_object()
                    .ok_or_else(|| "Invalid JSON response".to_string())?;
                match object.get("PowerState") {
                    Some(Value::String(state)) => state
                        .parse::<PowerState>()
                        .map(|_| ())
                        .map_err(|e| e.to_string()),
                    Some(other) => Err(format!("Invalid power state: {}", other)),
                    None => Err("Invalid power state: null".to_string()),
                }
            }
            Validator::PostsList => match json.as_array() {
                Some(posts) if !posts.is_empty() => Ok(()),
                _ => Err("Empty or invalid posts list".to_string()),
            },
            Validator::WeatherData => {
                if json.get("current_condition").is_some() {
                    Ok(())
                } else {
                    Err("Invalid weather data format".to_string())
                }
            }
        }
    }
}

/// One weighted request a simulated user may pick
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Name samples are grouped under
    pub name: String,
    pub weight: u32,
    pub target: TaskTarget,
    pub validator: Validator,
}

impl TaskSpec {
    pub fn new(name: &str, weight: u32, target: TaskTarget, validator: Validator) -> Self {
        Self {
            name: name.to_string(),
            weight,
            target,
            validator,
        }
    }
}
