//! Core domain models and checks for bmcprobe
//!
//! This crate holds the vocabulary shared by every suite: power states,
//! typed views over Redfish resources, the structural checks applied to raw
//! JSON bodies, the Redfish/IPMI sensor matcher and the case outcome types
//! that suites report through. It performs no I/O.

pub mod checks;
pub mod error;
pub mod outcome;
pub mod power;
pub mod resources;
pub mod sensors;

// Re-export commonly used types at the crate root
pub use error::{CoreError, Result};
pub use outcome::{CaseOutcome, CaseResult, SuiteReport};
pub use power::{PowerState, ResetType};
pub use resources::{ComputerSystem, ServiceRoot, TemperatureSensor, Thermal};
pub use sensors::{CrossCheckReport, MatchPolicy, SensorPair, SensorReading};
