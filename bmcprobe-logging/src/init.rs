use anyhow::{Context, Result};
use bmcprobe_config::domains::logging::{LogFormat, LoggingConfig};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize logging from configuration
pub fn init_logging_from_config(config: &LoggingConfig) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format, config.include_location)];

    if let Some(ref path) = config.file {
        layers.push(file_layer(path, config.include_location)?);
    }

    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(&config.filter_directive()))
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(log_level))
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise the given level, otherwise `info`
pub fn build_env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn console_layer(format: LogFormat, include_location: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_file(include_location)
        .with_line_number(include_location);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}

fn file_layer(path: &str, include_location: bool) -> Result<BoxedLayer> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(fmt::layer()
        .with_ansi(false)
        .with_file(include_location)
        .with_line_number(include_location)
        .with_writer(appender)
        .boxed())
}
