use anyhow::{Context, Result};
use bmcprobe_config::domains::logging::LogLevel;
use bmcprobe_config::{ConfigLoader, ProbeConfig};
use bmcprobe_logging::{init_logging_from_config, init_simple_tracing};
use clap::{CommandFactory, Parser};
use std::path::Path;
use tracing::{debug, info, warn};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::load::LoadOverrides;

/// Settings from `config_path` when it exists, else defaults; env
/// overrides apply either way
pub(crate) fn load_config(config_path: Option<&Path>) -> Result<ProbeConfig> {
    let loader = ConfigLoader::new();
    let Some(path) = config_path else {
        debug!("No --config given, using defaults and environment");
        return loader.from_env().context("Invalid settings in environment");
    };

    if !path.exists() {
        warn!("{} does not exist, using defaults and environment", path.display());
        return loader.from_env().context("Invalid settings in environment");
    }

    info!("Reading settings from {}", path.display());
    loader
        .from_file(path)
        .with_context(|| format!("Invalid settings in {}", path.display()))
}

/// `--log-level` wins over `logging.level`; plain console tracing is the
/// fallback when the configured layers cannot be built
fn init_logging(config: &ProbeConfig, log_level: Option<LogLevel>) -> Result<()> {
    let mut logging = config.logging.clone();
    if let Some(level) = log_level {
        logging.level = level;
    }

    init_logging_from_config(&logging).or_else(|e| {
        eprintln!("Logging setup failed ({}), using plain console output", e);
        init_simple_tracing(logging.level.as_str())
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands report their own load errors
    let config = match &cli.command {
        Some(Commands::Config { .. }) => ProbeConfig::default(),
        _ => load_config(cli.config.as_deref())?,
    };
    init_logging(&config, cli.log_level)?;
    debug!("bmcprobe starting");

    match cli.command {
        Some(Commands::Redfish {
            cases,
            fail_fast,
            auth_mode,
            report,
        }) => {
            let mut config = config;
            commands::redfish::apply_overrides(&mut config, &cases, fail_fast, auth_mode.as_deref())?;
            commands::redfish::run(&config, report.as_deref()).await
        }
        Some(Commands::Webui {
            cases,
            policy,
            spawn_driver,
            webdriver_url,
            report,
        }) => {
            let mut config = config;
            commands::webui::apply_overrides(
                &mut config,
                policy.as_deref(),
                spawn_driver,
                webdriver_url.as_deref(),
            )?;
            let cases = commands::webui::parse_cases(&cases)?;
            commands::webui::run(&config, &cases, report.as_deref()).await
        }
        Some(Commands::Load {
            users,
            spawn_rate,
            run_time,
            max_failure_rate,
            bmc_only,
            public_only,
            report,
        }) => {
            let mut config = config;
            LoadOverrides {
                users,
                spawn_rate,
                run_time,
                max_failure_rate,
                bmc_only,
                public_only,
                report,
            }
            .apply(&mut config)?;
            commands::load::run(&config).await
        }
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => {
                commands::config::handle_config_validate(&config_file)
            }
            ConfigCommands::Generate { output, force } => {
                commands::config::handle_config_generate(&output, force)
            }
            ConfigCommands::Show {
                config_file,
                format,
            } => commands::config::handle_config_show(
                config_file.as_deref().or(cli.config.as_deref()),
                format,
            ),
        },
        None => {
            Cli::command().print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
