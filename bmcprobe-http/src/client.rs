//! Shared reqwest client

use crate::errors::HttpError;
use bmcprobe_config::HttpConfig;
use reqwest::{redirect, Client};
use tracing::debug;

/// Client for one suite or load run; clones share the connection pool
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    debug!(
        timeout = ?config.timeout,
        verify_ssl = config.verify_ssl,
        "Building HTTP client"
    );

    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(!config.verify_ssl)
        .redirect(redirect::Policy::limited(config.max_redirects as usize))
        .build()
        .map_err(HttpError::from)
}
