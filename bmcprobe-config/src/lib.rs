//! Settings for a bmcprobe run
//!
//! One YAML file split into per-concern domains (target, Redfish, power,
//! sensors, UI, load, HTTP, logging). Each domain has defaults, may be
//! overridden from `BMCPROBE_*` variables and validates itself.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

pub use domains::{
    http::HttpConfig,
    load::LoadConfig,
    logging::LoggingConfig,
    power::PowerConfig,
    redfish::{AuthMode, RedfishConfig},
    sensors::{IpmiConfig, SensorsConfig},
    target::TargetConfig,
    utils::{parse_duration, serde_duration},
    webui::WebUiConfig,
    ProbeConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
