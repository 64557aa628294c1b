//! Command line surface

use bmcprobe_config::domains::logging::LogLevel;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bmcprobe", author, version, about, long_about = None)]
pub struct Cli {
    /// YAML settings file; `BMCPROBE_*` variables still apply on top
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `logging.level`: error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Redfish functional suite
    Redfish {
        /// Run only the named case; repeat for several
        #[arg(long = "case", value_name = "NAME")]
        cases: Vec<String>,

        /// Stop at the first failed case
        #[arg(long)]
        fail_fast: bool,

        /// Authentication mode: basic, session
        #[arg(long, value_name = "MODE")]
        auth_mode: Option<String>,

        /// Write the suite report as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Run the browser-driven web UI suite
    Webui {
        /// Run only the named case; repeat for several
        #[arg(long = "case", value_name = "NAME")]
        cases: Vec<String>,

        /// Failure policy: tally, fail-fast
        #[arg(long, value_name = "POLICY")]
        policy: Option<String>,

        /// Start the configured WebDriver binary for this run
        #[arg(long)]
        spawn_driver: bool,

        /// WebDriver server URL
        #[arg(long, value_name = "URL")]
        webdriver_url: Option<String>,

        /// Write the suite report as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Run the load profiles
    Load {
        /// Total simulated users
        #[arg(long, value_name = "COUNT")]
        users: Option<usize>,

        /// Users started per second
        #[arg(long, value_name = "RATE")]
        spawn_rate: Option<f64>,

        /// Run duration in seconds
        #[arg(long, value_name = "SECONDS")]
        run_time: Option<u64>,

        /// Fail when the failure rate exceeds this fraction (0.0 - 1.0)
        #[arg(long, value_name = "RATIO")]
        max_failure_rate: Option<f64>,

        /// Only run the BMC profile
        #[arg(long, conflicts_with = "public_only")]
        bmc_only: bool,

        /// Only run the public API profile
        #[arg(long)]
        public_only: bool,

        /// Write the results as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Inspect or scaffold settings files
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Load a settings file and run every domain check
    Validate {
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Write the defaults as a commented YAML file
    Generate {
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective settings with the password masked
    Show {
        /// Falls back to the global `--config`
        #[arg(long, value_name = "PATH")]
        config_file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ShowFormat::Yaml)]
        format: ShowFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowFormat {
    #[value(alias = "yml")]
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redfish_flags() {
        let cli = Cli::try_parse_from([
            "bmcprobe",
            "--log-level",
            "debug",
            "redfish",
            "--case",
            "power_on",
            "--case",
            "system_info",
            "--fail-fast",
        ])
        .unwrap();

        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Some(Commands::Redfish {
                cases, fail_fast, ..
            }) => {
                assert_eq!(cases, ["power_on", "system_info"]);
                assert!(fail_fast);
            }
            _ => panic!("expected redfish command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["bmcprobe", "load", "--users", "4", "--config", "probe.yaml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("probe.yaml")));
        assert!(matches!(cli.command, Some(Commands::Load { users: Some(4), .. })));
    }

    #[test]
    fn test_profile_filters_conflict() {
        let result = Cli::try_parse_from(["bmcprobe", "load", "--bmc-only", "--public-only"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_show_defaults_to_yaml() {
        let cli = Cli::try_parse_from(["bmcprobe", "config", "show"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                config_cmd: ConfigCommands::Show { format, config_file },
            }) => {
                assert_eq!(format, ShowFormat::Yaml);
                assert!(config_file.is_none());
            }
            _ => panic!("expected config show"),
        }
    }

    #[test]
    fn test_unknown_values_are_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["bmcprobe", "--log-level", "loud", "load"]).is_err());
        assert!(Cli::try_parse_from(["bmcprobe", "config", "show", "--format", "toml"]).is_err());

        let cli = Cli::try_parse_from(["bmcprobe", "config", "show", "--format", "yml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                config_cmd: ConfigCommands::Show {
                    format: ShowFormat::Yaml,
                    ..
                }
            })
        ));
    }
}
