//! `bmcprobe config validate|generate|show`

use anyhow::{Context, Result};
use bmcprobe_config::{ConfigLoader, ProbeConfig};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::cli::ShowFormat;
use crate::load_config;

/// Handle configuration validation
pub fn handle_config_validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(_config) => {
            println!("{}", "✓ Configuration file is valid".green());
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗ Configuration validation failed:".red(), e);
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handle configuration generation
pub fn handle_config_generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating sample configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, ProbeConfig::generate_sample()).context("Failed to write configuration file")?;

    println!("{} {:?}", "✓ Sample configuration generated at:".green(), output);
    println!(
        "Validate with: {}",
        format!("bmcprobe config validate --config-file {:?}", output).cyan()
    );
    Ok(())
}

/// Effective configuration with the password masked
pub fn render_config(config: &ProbeConfig, format: ShowFormat) -> Result<String> {
    let redacted = config.redacted();
    match format {
        ShowFormat::Yaml => serde_yaml::to_string(&redacted).context("Failed to serialize to YAML"),
        ShowFormat::Json => {
            serde_json::to_string_pretty(&redacted).context("Failed to serialize to JSON")
        }
    }
}

pub fn handle_config_show(config_file: Option<&Path>, format: ShowFormat) -> Result<()> {
    info!("Showing configuration as {:?}", format);
    let config = load_config(config_file)?;
    println!("{}", render_config(&config, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs").join("bmcprobe.yaml");

        handle_config_generate(&path, false).unwrap();
        assert!(path.exists());
        handle_config_validate(&path).unwrap();
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmcprobe.yaml");
        fs::write(&path, "target: {}\n").unwrap();

        let err = handle_config_generate(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "target: {}\n");

        handle_config_generate(&path, true).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "target: {}\n");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "load:\n  users: 0\n").unwrap();

        assert!(handle_config_validate(&path).is_err());
        assert!(handle_config_validate(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_render_masks_password() {
        let config = ProbeConfig::default();

        let yaml = render_config(&config, ShowFormat::Yaml).unwrap();
        assert!(!yaml.contains("0penBmc"));
        assert!(yaml.contains("root"));

        let json = render_config(&config, ShowFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["target"]["username"], "root");
        assert_ne!(value["target"]["password"], "0penBmc");
    }
}
