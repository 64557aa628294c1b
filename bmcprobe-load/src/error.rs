use bmcprobe_http::HttpError;
use thiserror::Error;

/// Errors raised while preparing or finishing a load run
///
/// Request failures during the run are samples, not errors.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("Invalid profile '{profile}': {reason}")]
    InvalidProfile { profile: String, reason: String },

    /// Spawn rate or run time that cannot be turned into start times
    #[error("Invalid load plan: {0}")]
    InvalidPlan(String),

    #[error("No load profile is enabled")]
    NoProfiles,

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failure rate {:.2}% exceeds the allowed {:.2}%", .rate * 100.0, .max * 100.0)]
    FailureRateExceeded { rate: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, LoadError>;
