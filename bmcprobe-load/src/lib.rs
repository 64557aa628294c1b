//! Load generation against the BMC and public HTTP APIs
//!
//! A [`Profile`] is a host plus a weighted set of [`TaskSpec`]s and a think
//! time range. The [`LoadRunner`] starts simulated users at the configured
//! spawn rate, spreads them over the enabled profiles and keeps them busy
//! until the run time elapses. Every request lands in a shared
//! [`LoadTracker`] which produces the final [`LoadResults`].

pub mod error;
pub mod profile;
pub mod report;
pub mod runner;
pub mod task;
pub mod tracker;

pub use error::{LoadError, Result};
pub use profile::{profiles_from_config, Profile};
pub use report::{check_failure_rate, write_report};
pub use runner::{LoadPlan, LoadRunner};
pub use task::{TaskSpec, TaskTarget, Validator};
pub use tracker::{LoadResults, LoadTracker, TaskResults};
