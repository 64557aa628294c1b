//! Redfish functional suite
//!
//! Ten sequential cases against one BMC: authentication, system information,
//! power transitions, thermal readouts, a Redfish/IPMI temperature cross-check,
//! the service root, and two session/idempotence checks. Each case yields a
//! [`CaseOutcome`](bmcprobe_core::CaseOutcome); the [`RedfishSuite`] runner
//! collects them into a [`SuiteReport`](bmcprobe_core::SuiteReport).

pub mod cases;
pub mod error;
pub mod ipmi;
pub mod power;
pub mod runner;
pub mod settings;
pub mod thermal;

#[cfg(test)]
pub(crate) mod testing;

pub use cases::{run_case, CaseId, SuiteContext};
pub use error::{RedfishError, Result};
pub use ipmi::{parse_sensor_list, IpmiError, IpmiTool, IpmitoolCommand};
pub use power::{PowerPolicies, PowerVerifier, TransitionOutcome};
pub use runner::RedfishSuite;
pub use settings::SuiteSettings;
pub use thermal::{fetch_thermal, ThermalFetch};
