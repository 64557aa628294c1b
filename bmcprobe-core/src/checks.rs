//! Structural checks applied to raw Redfish JSON bodies
//!
//! These operate on `serde_json::Value` rather than the typed views so that
//! a field which is present but `null` still counts as present, matching
//! how the Redfish schema distinguishes "absent" from "unknown".

use crate::error::{CoreError, Result};
use crate::resources::{ServiceRoot, TemperatureSensor};
use serde_json::Value;

/// Fields every service root must expose
pub const SERVICE_ROOT_REQUIRED: &[&str] = &["@odata.id", "Id", "Name", "RedfishVersion"];

/// Top-level collections looked for in the service root
pub const EXPECTED_ENDPOINTS: &[&str] = &["Systems", "Chassis", "Managers", "SessionService"];

/// Minimum number of [`EXPECTED_ENDPOINTS`] that must be present
pub const MIN_AVAILABLE_ENDPOINTS: usize = 2;

pub const SYSTEM_REQUIRED: &[&str] = &["Status", "PowerState"];

pub const STATUS_REQUIRED: &[&str] = &["Health", "State"];

pub const THERMAL_REQUIRED: &[&str] = &["@odata.id", "Temperatures"];

pub const SENSOR_REQUIRED: &[&str] = &[
    "@odata.id",
    "Name",
    "ReadingCelsius",
    "UpperThresholdCritical",
    "Status",
];

pub const SENSOR_RECOMMENDED: &[&str] = &[
    "PhysicalContext",
    "SensorNumber",
    "MinReadingRange",
    "MaxReadingRange",
    "UpperThresholdFatal",
];

/// Keywords that mark a temperature sensor as processor/memory related
pub const CPU_KEYWORDS: &[&str] = &["cpu", "processor", "core", "dimm"];

/// Fields from `fields` that `value` does not carry
pub fn missing_fields<'a>(value: &Value, fields: &[&'a str]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|field| value.get(**field).is_none())
        .copied()
        .collect()
}

/// Fail on the first field from `fields` that `value` does not carry
pub fn require_fields(value: &Value, resource: &str, fields: &[&str]) -> Result<()> {
    match missing_fields(value, fields).first() {
        Some(field) => Err(CoreError::MissingField {
            resource: resource.to_string(),
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

/// Check the system resource carries `Status`, `PowerState` and a complete `Status`
pub fn check_system_structure(system: &Value) -> Result<()> {
    require_fields(system, "ComputerSystem", SYSTEM_REQUIRED)?;
    require_fields(&system["Status"], "ComputerSystem.Status", STATUS_REQUIRED)
}

/// Availability of the [`EXPECTED_ENDPOINTS`] in a service root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointAvailability {
    /// `(endpoint, @odata.id)` for every endpoint present
    pub available: Vec<(String, String)>,
    pub missing: Vec<String>,
}

impl EndpointAvailability {
    pub fn count(&self) -> usize {
        self.available.len()
    }

    pub fn total(&self) -> usize {
        self.available.len() + self.missing.len()
    }

    pub fn passes(&self) -> bool {
        self.count() >= MIN_AVAILABLE_ENDPOINTS
    }
}

/// A `null` link counts as missing
pub fn endpoint_availability(service_root: &ServiceRoot) -> EndpointAvailability {
    let mut availability = EndpointAvailability::default();
    for endpoint in EXPECTED_ENDPOINTS {
        match service_root.link(endpoint) {
            Some(link) => availability
                .available
                .push((endpoint.to_string(), link.odata_id.clone())),
            None => availability.missing.push(endpoint.to_string()),
        }
    }
    availability
}

/// Result of checking one entry of the `Temperatures` collection
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStructure {
    pub name: String,
    pub missing_recommended: Vec<&'static str>,
    pub healthy: bool,
}

/// Required fields are hard errors; recommended ones are collected for reporting
pub fn check_sensor_structure(sensor: &Value) -> Result<SensorStructure> {
    let name = sensor
        .get("Name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let resource = format!("temperature sensor '{}'", name);

    require_fields(sensor, &resource, SENSOR_REQUIRED)?;
    require_fields(
        &sensor["Status"],
        &format!("{} Status", resource),
        STATUS_REQUIRED,
    )?;

    Ok(SensorStructure {
        missing_recommended: missing_fields(sensor, SENSOR_RECOMMENDED),
        healthy: sensor["Status"]["Health"].as_str() == Some("OK"),
        name,
    })
}

/// Whether a sensor's name or physical context marks it as CPU/memory related
pub fn is_cpu_sensor(sensor: &TemperatureSensor) -> bool {
    let name = sensor.name.as_deref().unwrap_or_default().to_lowercase();
    let context = sensor
        .physical_context
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    CPU_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword) || context.contains(keyword))
}

/// Inclusive normal operating range in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn contains(&self, celsius: f64) -> bool {
        self.min <= celsius && celsius <= self.max
    }
}

/// Normal range for a sensor, chosen from its name
pub fn normal_range_for(sensor_name: &str) -> TemperatureRange {
    let name = sensor_name.to_lowercase();
    if name.contains("cpu") || name.contains("processor") {
        TemperatureRange { min: 10.0, max: 95.0 }
    } else if name.contains("dimm") || name.contains("memory") {
        TemperatureRange { min: 15.0, max: 85.0 }
    } else {
        TemperatureRange { min: 10.0, max: 80.0 }
    }
}
