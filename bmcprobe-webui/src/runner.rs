//! UI suite runner

use bmcprobe_config::domains::webui::FailurePolicy;
use bmcprobe_config::ProbeConfig;
use bmcprobe_core::{CaseOutcome, CaseResult, SuiteReport};
use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::browser::{Browser, BrowserLauncher};
use crate::cases::{run_ui_case, UiCase, UiContext};
use crate::error::{Result, WebUiError};
use crate::login::discover;
use crate::settings::UiSettings;
use crate::webdriver::WebDriverClient;

pub const SUITE_NAME: &str = "webui";

/// Runs each case in its own browser session
pub struct WebUiSuite {
    launcher: Box<dyn BrowserLauncher>,
    settings: UiSettings,
    cases: Vec<UiCase>,
}

impl WebUiSuite {
    pub fn new(launcher: Box<dyn BrowserLauncher>, settings: UiSettings) -> Self {
        Self {
            launcher,
            settings,
            cases: UiCase::ALL.to_vec(),
        }
    }

    /// Suite talking to `webdriver_url`, which may differ from the configured one
    /// when the driver was spawned locally
    pub fn from_config(config: &ProbeConfig, webdriver_url: &str) -> Result<Self> {
        let launcher = WebDriverClient::new(webdriver_url, &config.webui.browser, &config.http)?;
        Ok(Self::new(Box::new(launcher), UiSettings::from_config(config)))
    }

    /// Restrict the run to `cases`, keeping declared order
    pub fn with_cases(mut self, cases: &[UiCase]) -> Self {
        if !cases.is_empty() {
            self.cases = UiCase::ALL
                .iter()
                .copied()
                .filter(|case| cases.contains(case))
                .collect();
        }
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.settings.failure_policy = policy;
        self
    }

    pub fn settings(&self) -> &UiSettings {
        &self.settings
    }

    /// Under fail-fast the first failure is returned as `Err`
    pub async fn run(&self) -> Result<SuiteReport> {
        let mut report = SuiteReport::new(SUITE_NAME);

        for case in &self.cases {
            info!("Running {}", case);
            let started_at = Utc::now();
            let started = Instant::now();

            let outcome = match self.run_in_browser(*case).await {
                Ok(()) => CaseOutcome::Passed,
                Err(e) => CaseOutcome::failed(e.to_string()),
            };
            let elapsed = started.elapsed();

            match &outcome {
                CaseOutcome::Failed(reason) => error!("{} - FAILED: {}", case, reason),
                _ => info!("{} - PASSED", case),
            }

            let failure = outcome.reason().map(String::from);
            report.push(CaseResult {
                name: case.name().to_string(),
                outcome,
                started_at,
                elapsed,
            });

            if let (Some(reason), FailurePolicy::FailFast) = (failure, self.settings.failure_policy) {
                return Err(WebUiError::CaseFailed {
                    case: case.name().to_string(),
                    reason,
                });
            }
        }

        info!("{}/{} UI cases passed", report.passed(), report.total());
        Ok(report)
    }

    /// Launch, discover, run, and always quit the browser
    async fn run_in_browser(&self, case: UiCase) -> Result<()> {
        let browser = self.launcher.launch().await?;
        let result = self.run_discovered(browser.as_ref(), case).await;

        if let Err(e) = browser.quit().await {
            warn!("Closing the browser failed: {}", e);
        }
        result
    }

    async fn run_discovered(&self, browser: &dyn Browser, case: UiCase) -> Result<()> {
        let base_url = discover(
            browser,
            &self.settings.candidate_urls,
            self.settings.timings.page_load,
        )
        .await?;

        let ctx = UiContext {
            browser,
            base_url: &base_url,
            settings: &self.settings,
        };
        run_ui_case(case, &ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLauncher, FakePage, FakeSite};

    const BASE: &str = "https://localhost:2443";
    const LOGIN_URL: &str = "https://localhost:2443/#/login";
    const DASHBOARD: &str = "https://localhost:2443/#/dashboard";

    fn site() -> FakeSite {
        FakeSite::new()
            .redirect(BASE, LOGIN_URL)
            .page(LOGIN_URL, FakePage::login_form("OpenBMC"))
            .page(DASHBOARD, FakePage::new("OpenBMC", "<nav>Overview</nav>"))
            .accepts("root", "0penBmc", DASHBOARD)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tally_runs_every_case_and_quits_each_browser() {
        let launcher = FakeLauncher::new(site());
        let suite = WebUiSuite::new(Box::new(launcher.clone()), UiSettings::default());

        let report = suite.run().await.unwrap();
        assert_eq!(report.total(), 8);
        // no feature pages on this site
        assert_eq!(report.passed(), 4);
        assert_eq!(report.failed(), 4);

        let browsers = launcher.browsers();
        assert_eq!(browsers.len(), 8);
        assert!(browsers.iter().all(|browser| browser.is_quit()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_returns_first_failure() {
        let launcher = FakeLauncher::new(site());
        let suite = WebUiSuite::new(Box::new(launcher.clone()), UiSettings::default())
            .with_failure_policy(FailurePolicy::FailFast);

        let err = suite.run().await.unwrap_err();
        match err {
            WebUiError::CaseFailed { case, .. } => assert_eq!(case, "power_management"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(launcher.browsers().len(), 5);
        assert!(launcher.browsers().iter().all(|browser| browser.is_quit()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_interface_fails_case() {
        let launcher = FakeLauncher::new(FakeSite::new().page(BASE, FakePage::new("Apache", "It works")));
        let suite = WebUiSuite::new(Box::new(launcher.clone()), UiSettings::default())
            .with_cases(&[UiCase::CorrectLogin]);

        let report = suite.run().await.unwrap();
        assert_eq!(report.total(), 1);
        let reason = report.outcome_of("correct_login").unwrap().reason().unwrap();
        assert!(reason.contains("Web interface not found"));
        assert!(launcher.browsers()[0].is_quit());
    }
}
