//! Locally spawned WebDriver server

use bmcprobe_config::domains::webui::{BrowserConfig, DriverConfig};
use bmcprobe_http::HttpConfig;
use bmcprobe_resilience::{PollPolicy, Poller};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{Result, WebUiError};
use crate::webdriver::WebDriverClient;

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Driver child process; killed when dropped
#[derive(Debug)]
pub struct DriverProcess {
    pub pid: Option<u32>,
    pub url: String,
    child: Child,
}

impl DriverProcess {
    /// Spawn the driver binary and wait until `/status` reports ready
    pub async fn spawn(
        config: &DriverConfig,
        browser: &BrowserConfig,
        http: &HttpConfig,
    ) -> Result<Self> {
        debug!("Spawning WebDriver {} on port {}", config.path, config.port);

        let mut cmd = Command::new(&config.path);
        cmd.arg(format!("--port={}", config.port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            WebUiError::DriverSpawn(format!("Failed to spawn {}: {}", config.path, e))
        })?;

        let process = Self {
            pid: child.id(),
            url: format!("http://127.0.0.1:{}", config.port),
            child,
        };

        let client = WebDriverClient::new(&process.url, browser, http)?;
        wait_until_ready(&client, config.startup_timeout).await?;

        info!("WebDriver ready at {} (pid {:?})", process.url, process.pid);
        Ok(process)
    }

    pub async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to stop WebDriver: {}", e);
        }
    }
}

/// Poll `/status` until the server is ready or `timeout` elapses
pub async fn wait_until_ready(client: &WebDriverClient, timeout: Duration) -> Result<()> {
    let attempts = (timeout.as_millis() / STATUS_POLL_INTERVAL.as_millis()).max(1) as u32;
    let poller = Poller::new(PollPolicy::fixed(attempts, STATUS_POLL_INTERVAL));

    poller
        .poll_until(
            |_| async move {
                // connection refused while the server is still binding
                Ok::<bool, WebUiError>(client.is_ready().await.unwrap_or(false))
            },
            |ready| *ready,
        )
        .await
        .map(|_| ())
        .map_err(|_| WebUiError::DriverStartup(timeout))
}
