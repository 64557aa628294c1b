//! `bmcprobe webui`

use anyhow::{Context, Result};
use bmcprobe_config::domains::webui::FailurePolicy;
use bmcprobe_config::ProbeConfig;
use bmcprobe_webui::{DriverProcess, UiCase, WebUiSuite};
use std::path::Path;
use tracing::info;

use super::finish_suite;

/// Fold command-line flags into the loaded configuration
pub fn apply_overrides(
    config: &mut ProbeConfig,
    policy: Option<&str>,
    spawn_driver: bool,
    webdriver_url: Option<&str>,
) -> Result<()> {
    if let Some(policy) = policy {
        config.webui.failure_policy = policy.parse::<FailurePolicy>().map_err(anyhow::Error::msg)?;
    }
    if spawn_driver {
        config.webui.driver.spawn = true;
    }
    if let Some(url) = webdriver_url {
        config.webui.webdriver_url = url.to_string();
    }
    Ok(())
}

pub fn parse_cases(names: &[String]) -> Result<Vec<UiCase>> {
    names
        .iter()
        .map(|name| name.parse::<UiCase>().map_err(anyhow::Error::msg))
        .collect()
}

pub async fn run(config: &ProbeConfig, cases: &[UiCase], report_path: Option<&Path>) -> Result<()> {
    let driver = if config.webui.driver.spawn {
        Some(
            DriverProcess::spawn(&config.webui.driver, &config.webui.browser, &config.http)
                .await
                .context("Failed to start WebDriver")?,
        )
    } else {
        None
    };
    let webdriver_url = driver
        .as_ref()
        .map(|driver| driver.url.clone())
        .unwrap_or_else(|| config.webui.webdriver_url.clone());

    info!(
        "Running web UI suite through {} ({} policy)",
        webdriver_url, config.webui.failure_policy
    );
    let result = run_suite(config, cases, &webdriver_url).await;

    if let Some(driver) = driver {
        driver.stop().await;
    }

    finish_suite(&result?, report_path)
}

async fn run_suite(
    config: &ProbeConfig,
    cases: &[UiCase],
    webdriver_url: &str,
) -> Result<bmcprobe_core::SuiteReport> {
    let suite = WebUiSuite::from_config(config, webdriver_url)
        .context("Failed to prepare web UI suite")?
        .with_cases(cases);
    Ok(suite.run().await?)
}
