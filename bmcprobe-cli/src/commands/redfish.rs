//! `bmcprobe redfish`

use anyhow::{Context, Result};
use bmcprobe_config::{AuthMode, ProbeConfig};
use bmcprobe_redfish::RedfishSuite;
use std::path::Path;
use tracing::info;

use super::finish_suite;

/// Fold command-line flags into the loaded configuration
pub fn apply_overrides(
    config: &mut ProbeConfig,
    cases: &[String],
    fail_fast: bool,
    auth_mode: Option<&str>,
) -> Result<()> {
    if !cases.is_empty() {
        config.redfish.cases = cases.to_vec();
    }
    if fail_fast {
        config.redfish.fail_fast = true;
    }
    if let Some(mode) = auth_mode {
        config.redfish.auth_mode = mode.parse::<AuthMode>().map_err(anyhow::Error::msg)?;
    }
    Ok(())
}

pub async fn run(config: &ProbeConfig, report_path: Option<&Path>) -> Result<()> {
    let suite = RedfishSuite::from_config(config).context("Failed to prepare Redfish suite")?;
    info!(
        "Running {} Redfish cases against {} ({} auth)",
        suite.settings().cases.len(),
        config.target.base_url(),
        suite.settings().auth_mode
    );

    let report = suite.run().await.context("Redfish suite aborted")?;
    finish_suite(&report, report_path)
}
