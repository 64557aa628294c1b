//! Transport-level failures
//!
//! A non-2xx status is not an error at this layer; suites inspect the
//! response themselves.

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Connect, TLS or timeout failure, or a client that could not be built
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bad target URL '{url}': {reason}")]
    BadTarget { url: String, reason: String },

    #[error("Response body is not JSON: {0}")]
    Body(#[from] serde_json::Error),

    /// Create-session reply lacked the session id or token
    #[error("Session reply missing {0}")]
    IncompleteSession(&'static str),
}

impl HttpError {
    pub fn bad_target(url: &str, reason: impl ToString) -> Self {
        HttpError::BadTarget {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
