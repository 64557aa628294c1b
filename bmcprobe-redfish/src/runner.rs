//! Sequential suite runner

use bmcprobe_config::{AuthMode, ProbeConfig};
use bmcprobe_core::{CaseOutcome, CaseResult, SuiteReport};
use bmcprobe_http::{paths, Auth, RedfishApi, RedfishClient, Session};
use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::cases::{run_case, SuiteContext};
use crate::error::{expect_status, Result};
use crate::ipmi::{IpmiTool, IpmitoolCommand};
use crate::settings::SuiteSettings;

pub const SUITE_NAME: &str = "redfish";

/// Runs the selected cases against one BMC
pub struct RedfishSuite {
    /// Unauthenticated client; the runner attaches credentials per run
    api: Box<dyn RedfishApi>,
    ipmi: Box<dyn IpmiTool>,
    settings: SuiteSettings,
}

impl RedfishSuite {
    pub fn new(api: Box<dyn RedfishApi>, ipmi: Box<dyn IpmiTool>, settings: SuiteSettings) -> Self {
        Self {
            api,
            ipmi,
            settings,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        let api = RedfishClient::new(config.target.base_url(), &config.http, Auth::None)?;
        let ipmi = IpmitoolCommand::from(&config.sensors.ipmi);

        Ok(Self::new(
            Box::new(api),
            Box::new(ipmi),
            SuiteSettings::from_config(config)?,
        ))
    }

    pub fn settings(&self) -> &SuiteSettings {
        &self.settings
    }

    /// Run every selected case; only a failed session login is an `Err`
    pub async fn run(&self) -> Result<SuiteReport> {
        let (api, session) = self.authenticate().await?;
        let ctx = SuiteContext {
            api: api.as_ref(),
            ipmi: self.ipmi.as_ref(),
            settings: &self.settings,
        };

        let mut report = SuiteReport::new(SUITE_NAME);
        for case in &self.settings.cases {
            info!("Running {}", case);
            let started_at = Utc::now();
            let started = Instant::now();

            let outcome = match run_case(*case, &ctx).await {
                Ok(outcome) => outcome,
                Err(e) => CaseOutcome::failed(e.to_string()),
            };
            let elapsed = started.elapsed();

            match &outcome {
                CaseOutcome::Passed => info!("{} PASSED in {:?}", case, elapsed),
                CaseOutcome::Skipped(reason) => warn!("{} SKIPPED: {}", case, reason),
                CaseOutcome::Failed(reason) => error!("{} FAILED: {}", case, reason),
            }

            let stop = outcome.is_failure() && self.settings.fail_fast;
            report.push(CaseResult {
                name: case.name().to_string(),
                outcome,
                started_at,
                elapsed,
            });
            if stop {
                warn!("Stopping after first failure");
                break;
            }
        }

        if let Some(session) = session {
            self.teardown(api.as_ref(), &session).await;
        }

        info!(
            "{} passed, {} failed, {} skipped",
            report.passed(),
            report.failed(),
            report.skipped()
        );
        Ok(report)
    }

    async fn authenticate(&self) -> Result<(Box<dyn RedfishApi>, Option<Session>)> {
        let settings = &self.settings;
        match settings.auth_mode {
            AuthMode::Basic => Ok((
                self.api
                    .with_auth(Auth::basic(&settings.username, &settings.password)),
                None,
            )),
            AuthMode::Session => {
                let response = self
                    .api
                    .create_session(&settings.username, &settings.password)
                    .await?;
                expect_status(&response, paths::SESSIONS, &[200, 201])?;
                let session = Session::from_response(&response)?;
                info!("Suite session {} created", session.id);
                Ok((self.api.with_auth(session.auth()), Some(session)))
            }
        }
    }

    async fn teardown(&self, api: &dyn RedfishApi, session: &Session) {
        match api.delete_session(&session.id).await {
            Ok(response) if response.is_success() => {
                info!("Suite session {} deleted", session.id)
            }
            Ok(response) => warn!(
                "Deleting suite session {} returned {}",
                session.id, response.status
            ),
            Err(e) => warn!("Deleting suite session {} failed: {}", session.id, e),
        }
    }
}
