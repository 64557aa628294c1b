//! UI suite error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebUiError {
    #[error("WebDriver transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Http(#[from] bmcprobe_http::HttpError),

    /// W3C error object returned by the driver
    #[error("WebDriver error '{error}' ({status}): {message}")]
    WebDriver {
        status: u16,
        error: String,
        message: String,
    },

    #[error("No element matches {0}")]
    NoSuchElement(String),

    #[error("Malformed WebDriver response: {0}")]
    Protocol(String),

    #[error("Failed to start WebDriver: {0}")]
    DriverSpawn(String),

    #[error("WebDriver not ready after {0:?}")]
    DriverStartup(std::time::Duration),

    #[error("Web interface not found at {0}")]
    InterfaceNotFound(String),

    #[error("{0}")]
    Assertion(String),

    /// First failure under the fail-fast policy
    #[error("{case} failed: {reason}")]
    CaseFailed { case: String, reason: String },
}

impl WebUiError {
    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        WebUiError::Assertion(message.into())
    }
}

pub type Result<T> = std::result::Result<T, WebUiError>;
