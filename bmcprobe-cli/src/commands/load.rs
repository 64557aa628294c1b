//! `bmcprobe load`

use anyhow::{Context, Result};
use bmcprobe_config::validation::Validatable;
use bmcprobe_config::ProbeConfig;
use bmcprobe_load::{check_failure_rate, write_report, LoadRunner};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::output::format_load_results;

/// Command-line adjustments to the configured load run
#[derive(Debug, Default)]
pub struct LoadOverrides {
    pub users: Option<usize>,
    pub spawn_rate: Option<f64>,
    pub run_time: Option<u64>,
    pub max_failure_rate: Option<f64>,
    pub bmc_only: bool,
    pub public_only: bool,
    pub report: Option<PathBuf>,
}

impl LoadOverrides {
    /// Apply to `config` and re-validate the load domain
    pub fn apply(self, config: &mut ProbeConfig) -> Result<()> {
        let load = &mut config.load;
        if let Some(users) = self.users {
            load.users = users;
        }
        if let Some(rate) = self.spawn_rate {
            load.spawn_rate = rate;
        }
        if let Some(seconds) = self.run_time {
            load.run_time = Duration::from_secs(seconds);
        }
        if self.max_failure_rate.is_some() {
            load.max_failure_rate = self.max_failure_rate;
        }
        if self.bmc_only {
            load.public_api.enabled = false;
        }
        if self.public_only {
            load.bmc.enabled = false;
        }
        if let Some(path) = self.report {
            load.report_path = Some(path.to_string_lossy().into_owned());
        }

        load.validate().context("Invalid load settings")?;
        Ok(())
    }
}

pub async fn run(config: &ProbeConfig) -> Result<()> {
    let runner = LoadRunner::from_config(config).context("Failed to prepare load run")?;
    info!(
        "Load run: {} users at {}/s for {:?}",
        runner.plan().users,
        runner.plan().spawn_rate,
        runner.plan().run_time
    );

    let results = runner.run().await.context("Load run could not start")?;
    print!("{}", format_load_results(&results));

    if let Some(path) = &config.load.report_path {
        write_report(path, &results)?;
    }

    check_failure_rate(&results, config.load.max_failure_rate)?;
    Ok(())
}
