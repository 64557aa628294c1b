//! Redfish suite error types

use bmcprobe_core::{CoreError, PowerState};
use bmcprobe_http::{ApiResponse, HttpError};
use thiserror::Error;

use crate::ipmi::IpmiError;

/// Errors that end a case as failed, or keep the suite from starting
#[derive(Debug, Error)]
pub enum RedfishError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Ipmi(#[from] IpmiError),

    #[error("Expected status {expected} from {path}, got {actual}: {body}")]
    UnexpectedStatus {
        path: String,
        expected: String,
        actual: u16,
        body: String,
    },

    #[error("Power state {target} not reached after {attempts} attempts (last state: {last})")]
    PowerTimeout {
        target: PowerState,
        attempts: u32,
        last: String,
    },

    #[error("Unknown case: {0}")]
    UnknownCase(String),

    #[error("{0}")]
    Assertion(String),
}

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, RedfishError>;

/// Fail unless `response` carries one of `expected`
pub fn expect_status(response: &ApiResponse, path: &str, expected: &[u16]) -> Result<()> {
    if expected.contains(&response.status) {
        return Ok(());
    }

    Err(RedfishError::UnexpectedStatus {
        path: path.to_string(),
        expected: expected
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(" or "),
        actual: response.status,
        body: response.snippet(),
    })
}
