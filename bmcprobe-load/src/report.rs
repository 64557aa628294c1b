//! Persisting and judging load results

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::error::{LoadError, Result};
use crate::tracker::LoadResults;

/// Write `results` as pretty-printed JSON, creating parent directories
pub fn write_report(path: impl AsRef<Path>, results: &LoadResults) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, results)?;
    info!("Load report written to {}", path.display());
    Ok(())
}

/// Without a threshold every run passes
pub fn check_failure_rate(results: &LoadResults, max_failure_rate: Option<f64>) -> Result<()> {
    match max_failure_rate {
        Some(max) if results.failure_rate > max => Err(LoadError::FailureRateExceeded {
            rate: results.failure_rate,
            max,
        }),
        _ => Ok(()),
    }
}
