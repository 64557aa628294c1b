//! Subcommand handlers

pub mod config;
pub mod load;
pub mod redfish;
pub mod webui;

use anyhow::{Context, Result};
use bmcprobe_core::SuiteReport;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::output::format_suite_report;

/// Print the report, optionally save it, and fail when any case failed
pub(crate) fn finish_suite(report: &SuiteReport, report_path: Option<&Path>) -> Result<()> {
    print!("{}", format_suite_report(report));

    if let Some(path) = report_path {
        write_json(path, report)?;
        info!("Suite report written to {:?}", path);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} of {} {} cases failed",
            report.failed(),
            report.total(),
            report.suite
        ))
    }
}

fn write_json(path: &Path, report: &SuiteReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create report directory")?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report to {:?}", path))
}
