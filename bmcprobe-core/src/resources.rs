//! Typed views over the Redfish resources the harness reads
//!
//! Every field is optional: these views are for reading values after the
//! structural checks in [`crate::checks`] have run against the raw body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Link object (`{"@odata.id": "..."}`); a link without an id still counts
/// as present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ODataLink {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
}

/// `/redfish/v1/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub redfish_version: Option<String>,
    pub systems: Option<ODataLink>,
    pub chassis: Option<ODataLink>,
    pub managers: Option<ODataLink>,
    pub session_service: Option<ODataLink>,
}

impl ServiceRoot {
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Top-level collection link by its service-root key, e.g. `Systems`
    pub fn link(&self, endpoint: &str) -> Option<&ODataLink> {
        match endpoint {
            "Systems" => self.systems.as_ref(),
            "Chassis" => self.chassis.as_ref(),
            "Managers" => self.managers.as_ref(),
            "SessionService" => self.session_service.as_ref(),
            _ => None,
        }
    }
}

/// `Status` object shared by most resources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub health: Option<String>,
    pub state: Option<String>,
}

impl Status {
    pub fn is_healthy(&self) -> bool {
        self.health.as_deref() == Some("OK")
    }
}

/// `/redfish/v1/Systems/system`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub power_state: Option<String>,
    pub status: Option<Status>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
}

impl ComputerSystem {
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Entry of the `Temperatures` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemperatureSensor {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub name: Option<String>,
    pub reading_celsius: Option<f64>,
    pub physical_context: Option<String>,
    pub sensor_number: Option<i64>,
    pub upper_threshold_critical: Option<f64>,
    pub upper_threshold_fatal: Option<f64>,
    pub min_reading_range: Option<f64>,
    pub max_reading_range: Option<f64>,
    pub status: Option<Status>,
}

impl TemperatureSensor {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// `/redfish/v1/Chassis/{id}/Thermal`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thermal {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    #[serde(default)]
    pub temperatures: Vec<TemperatureSensor>,
}

impl Thermal {
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Sensors that report a reading, as `(name, celsius)` in document order
    pub fn readings(&self) -> Vec<crate::sensors::SensorReading> {
        self.temperatures
            .iter()
            .filter_map(|sensor| {
                sensor.reading_celsius.map(|celsius| crate::sensors::SensorReading {
                    name: sensor.name.clone().unwrap_or_default(),
                    celsius,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_computer_system_view() {
        let body = json!({
            "Id": "system",
            "Name": "System",
            "PowerState": "On",
            "Status": {"Health": "OK", "State": "Enabled"},
            "Manufacturer": "OpenBMC"
        });
        let system = ComputerSystem::from_value(&body).unwrap();
        assert_eq!(system.power_state.as_deref(), Some("On"));
        assert!(system.status.unwrap().is_healthy());
        assert!(system.model.is_none());
    }

    #[test]
    fn test_thermal_readings_skip_null() {
        let body = json!({
            "@odata.id": "/redfish/v1/Chassis/chassis/Thermal",
            "Temperatures": [
                {"Name": "CPU Temp", "ReadingCelsius": 45.0},
                {"Name": "Inlet", "ReadingCelsius": null},
                {"Name": "DIMM A", "ReadingCelsius": 38}
            ]
        });
        let thermal = Thermal::from_value(&body).unwrap();
        let readings = thermal.readings();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].name, "CPU Temp");
        assert_eq!(readings[1].celsius, 38.0);
    }

    #[test]
    fn test_thermal_without_temperatures() {
        let thermal = Thermal::from_value(&json!({})).unwrap();
        assert!(thermal.temperatures.is_empty());
    }

    #[test]
    fn test_service_root_links() {
        let root = ServiceRoot::from_value(&json!({
            "@odata.id": "/redfish/v1",
            "RedfishVersion": "1.9.0",
            "Systems": {"@odata.id": "/redfish/v1/Systems"},
            "Managers": {},
            "Chassis": null
        }))
        .unwrap();

        assert_eq!(root.redfish_version.as_deref(), Some("1.9.0"));
        assert_eq!(root.link("Systems").unwrap().odata_id, "/redfish/v1/Systems");
        assert_eq!(root.link("Managers").unwrap().odata_id, "");
        assert!(root.link("Chassis").is_none());
        assert!(root.link("AccountService").is_none());
    }
}
