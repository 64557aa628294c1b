//! Browser-driven UI cases

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{Browser, Locator};
use crate::error::{Result, WebUiError};
use crate::login::{find_page_mentioning, submit_credentials, wait_for_element};
use crate::settings::UiSettings;

const LOCKOUT_REFRESH_SETTLE: Duration = Duration::from_secs(1);
const LOCKOUT_ATTEMPT_SETTLE: Duration = Duration::from_secs(2);
const NAVIGATION_SETTLE: Duration = Duration::from_secs(2);

const POWER_PATHS: &[&str] = &["/redfish/v1/Systems/system", "/ui/#/system", "/ui/system"];
const POWER_INDICATORS: &[&str] = &["power", "reset", "shutdown", "reboot"];

const REDFISH_PATHS: &[&str] = &["/redfish/v1/", "/redfish", "/ui/#/redfish"];
const REDFISH_INDICATORS: &[&str] = &["redfish", "odata", "json", "api"];

const THERMAL_PATHS: &[&str] = &[
    "/redfish/v1/Chassis/chassis/Thermal",
    "/ui/#/thermal",
    "/ui/thermal",
];
const THERMAL_INDICATORS: &[&str] = &["temperature", "thermal", "sensor"];

/// Visible labels that lead to the inventory view
const INVENTORY_LABELS: &[&str] = &[
    "Inventory",
    "Hardware",
    "System",
    "Configuration",
    "CPU",
    "Memory",
    "Storage",
];
const INVENTORY_PATHS: &[&str] = &["/redfish/v1/Systems/system", "/ui/#/inventory", "/ui/inventory"];
const INVENTORY_INDICATORS: &[&str] = &["cpu", "processor", "memory", "ram"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiCase {
    CorrectLogin,
    WrongUsername,
    WrongPassword,
    AccountLockout,
    PowerManagement,
    RedfishApiAccess,
    TemperatureMonitoring,
    InventoryDisplay,
}

impl UiCase {
    pub const ALL: [UiCase; 8] = [
        UiCase::CorrectLogin,
        UiCase::WrongUsername,
        UiCase::WrongPassword,
        UiCase::AccountLockout,
        UiCase::PowerManagement,
        UiCase::RedfishApiAccess,
        UiCase::TemperatureMonitoring,
        UiCase::InventoryDisplay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UiCase::CorrectLogin => "correct_login",
            UiCase::WrongUsername => "wrong_username",
            UiCase::WrongPassword => "wrong_password",
            UiCase::AccountLockout => "account_lockout",
            UiCase::PowerManagement => "power_management",
            UiCase::RedfishApiAccess => "redfish_api_access",
            UiCase::TemperatureMonitoring => "temperature_monitoring",
            UiCase::InventoryDisplay => "inventory_display",
        }
    }
}

impl fmt::Display for UiCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UiCase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        UiCase::ALL
            .iter()
            .copied()
            .find(|case| case.name() == s)
            .ok_or_else(|| format!("Unknown UI case: {}", s))
    }
}

/// A discovered interface and an open browser pointed at it
pub struct UiContext<'a> {
    pub browser: &'a dyn Browser,
    pub base_url: &'a str,
    pub settings: &'a UiSettings,
}

/// Run one case; an `Err` is a failed case
pub async fn run_ui_case(case: UiCase, ctx: &UiContext<'_>) -> Result<()> {
    let settings = ctx.settings;
    match case {
        UiCase::CorrectLogin => correct_login(ctx).await,
        UiCase::WrongUsername => {
            rejected_login(ctx, &settings.invalid_username, &settings.password, "username").await
        }
        UiCase::WrongPassword => {
            rejected_login(ctx, &settings.username, &settings.wrong_password, "password").await
        }
        UiCase::AccountLockout => {
            account_lockout(ctx).await;
            Ok(())
        }
        UiCase::PowerManagement => {
            logged_in_page_check(ctx, POWER_PATHS, POWER_INDICATORS, "Power management").await
        }
        UiCase::RedfishApiAccess => {
            logged_in_page_check(ctx, REDFISH_PATHS, REDFISH_INDICATORS, "Redfish API").await
        }
        UiCase::TemperatureMonitoring => {
            logged_in_page_check(ctx, THERMAL_PATHS, THERMAL_INDICATORS, "Temperature monitoring")
                .await
        }
        UiCase::InventoryDisplay => inventory_display(ctx).await,
    }
}

async fn current_url_lower(browser: &dyn Browser) -> Result<String> {
    Ok(browser.current_url().await?.to_lowercase())
}

async fn correct_login(ctx: &UiContext<'_>) -> Result<()> {
    let settings = ctx.settings;
    submit_credentials(ctx.browser, &settings.username, &settings.password).await?;
    sleep(settings.timings.login_settle).await;

    let url = current_url_lower(ctx.browser).await?;
    if url.contains("login") {
        return Err(WebUiError::assertion(format!("Still on the login page: {}", url)));
    }
    let title = ctx.browser.title().await?.to_lowercase();
    if title.contains("login") {
        return Err(WebUiError::assertion(format!("Title still mentions login: {}", title)));
    }
    Ok(())
}

async fn rejected_login(ctx: &UiContext<'_>, username: &str, password: &str, field: &str) -> Result<()> {
    submit_credentials(ctx.browser, username, password).await?;
    sleep(ctx.settings.timings.rejected_settle).await;

    let url = current_url_lower(ctx.browser).await?;
    if !url.contains("login") {
        return Err(WebUiError::assertion(format!(
            "Login with a wrong {} was not rejected: {}",
            field, url
        )));
    }
    Ok(())
}

/// Repeated wrong passwords followed by a correct login; never fails
async fn account_lockout(ctx: &UiContext<'_>) {
    let browser = ctx.browser;
    let settings = ctx.settings;

    for attempt in 0..settings.lockout_attempts {
        let password = format!("{}_{}", settings.wrong_password, attempt);
        let result = async {
            browser.refresh().await?;
            sleep(LOCKOUT_REFRESH_SETTLE).await;
            submit_credentials(browser, &settings.username, &password).await?;
            sleep(LOCKOUT_ATTEMPT_SETTLE).await;
            Ok::<(), WebUiError>(())
        }
        .await;
        if let Err(e) = result {
            debug!("Failed login attempt {} did not complete: {}", attempt + 1, e);
        }
    }

    let result = async {
        browser.refresh().await?;
        sleep(LOCKOUT_ATTEMPT_SETTLE).await;
        submit_credentials(browser, &settings.username, &settings.password).await?;
        sleep(settings.timings.login_settle).await;
        current_url_lower(browser).await
    }
    .await;

    match result {
        Ok(url) if url.contains("login") => warn!(
            "Still on the login page after {} failed attempts; the account may be locked",
            settings.lockout_attempts
        ),
        Ok(_) => info!(
            "Correct login accepted after {} failed attempts",
            settings.lockout_attempts
        ),
        Err(e) => warn!("Lockout check did not complete: {}", e),
    }
}

async fn login(ctx: &UiContext<'_>) -> Result<()> {
    let settings = ctx.settings;
    submit_credentials(ctx.browser, &settings.username, &settings.password).await?;
    sleep(settings.timings.login_settle).await;

    if current_url_lower(ctx.browser).await?.contains("login") {
        return Err(WebUiError::assertion("Failed to log in"));
    }
    Ok(())
}

async fn logged_in_page_check(
    ctx: &UiContext<'_>,
    paths: &[&str],
    indicators: &[&str],
    feature: &str,
) -> Result<()> {
    login(ctx).await?;

    let page = find_page_mentioning(
        ctx.browser,
        ctx.base_url,
        paths,
        indicators,
        ctx.settings.timings.page_load,
    )
    .await;

    match page {
        Some(_) => Ok(()),
        None => Err(WebUiError::assertion(format!("{} not found in the web UI", feature))),
    }
}

async fn inventory_display(ctx: &UiContext<'_>) -> Result<()> {
    login(ctx).await?;
    let browser = ctx.browser;

    let mut found = false;
    for label in INVENTORY_LABELS {
        let locator = Locator::containing_text(label);
        let Some(element) = wait_for_element(browser, &locator, ctx.settings.timings.element_wait).await?
        else {
            continue;
        };

        found = true;
        let text = browser.text(&element).await.unwrap_or_default();
        info!("Inventory element found: {}", text);

        match browser.click(&element).await {
            Ok(()) => {
                sleep(NAVIGATION_SETTLE).await;
                info!("Navigated to inventory via '{}'", label);
                break;
            }
            Err(e) => debug!("Clicking '{}' failed: {}", label, e),
        }
    }

    if !found {
        info!("No inventory elements found, trying inventory URLs");
        found = find_page_mentioning(
            browser,
            ctx.base_url,
            INVENTORY_PATHS,
            INVENTORY_INDICATORS,
            ctx.settings.timings.page_load,
        )
        .await
        .is_some();
    }

    if found {
        Ok(())
    } else {
        Err(WebUiError::assertion("Inventory not found in the web UI"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBrowser, FakeElement, FakePage, FakeSite};

    const BASE: &str = "https://bmc";
    const LOGIN_URL: &str = "https://bmc/#/login";
    const DASHBOARD: &str = "https://bmc/#/dashboard";

    fn site() -> FakeSite {
        FakeSite::new()
            .redirect(BASE, LOGIN_URL)
            .page(LOGIN_URL, FakePage::login_form("OpenBMC"))
            .page(DASHBOARD, FakePage::new("OpenBMC", "<nav>Overview</nav>"))
            .accepts("root", "0penBmc", DASHBOARD)
    }

    async fn run(case: UiCase, site: FakeSite) -> (Result<()>, FakeBrowser) {
        let browser = FakeBrowser::new(site);
        browser.goto(BASE).await.unwrap();
        let settings = UiSettings::default();
        let ctx = UiContext {
            browser: &browser,
            base_url: BASE,
            settings: &settings,
        };
        (run_ui_case(case, &ctx).await, browser)
    }

    #[test]
    fn test_case_names() {
        for case in UiCase::ALL {
            assert_eq!(case.name().parse::<UiCase>().unwrap(), case);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_correct_login() {
        let (result, browser) = run(UiCase::CorrectLogin, site()).await;
        assert!(result.is_ok());
        assert_eq!(browser.submitted(), vec![("root".to_string(), "0penBmc".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_correct_login_fails_when_rejected() {
        let site = site().accepts("admin", "other", DASHBOARD);
        let (result, _) = run(UiCase::CorrectLogin, site).await;
        assert!(result.unwrap_err().to_string().contains("login page"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_credentials_stay_on_login() {
        let (result, browser) = run(UiCase::WrongUsername, site()).await;
        assert!(result.is_ok());
        assert_eq!(browser.submitted()[0].0, "invalid_user");

        let (result, browser) = run(UiCase::WrongPassword, site()).await;
        assert!(result.is_ok());
        assert_eq!(browser.submitted()[0].1, "wrong_password");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_password_accepted_fails() {
        let site = site().accepts("root", "wrong_password", DASHBOARD);
        let (result, _) = run(UiCase::WrongPassword, site).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_lockout_attempts() {
        let (result, browser) = run(UiCase::AccountLockout, site()).await;
        assert!(result.is_ok());

        let passwords: Vec<String> = browser.submitted().into_iter().map(|(_, p)| p).collect();
        assert_eq!(
            passwords,
            vec![
                "wrong_password_0",
                "wrong_password_1",
                "wrong_password_2",
                "0penBmc"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_lockout_never_fails() {
        // no login form at all
        let site = FakeSite::new().page(BASE, FakePage::new("BMC", ""));
        let (result, browser) = run(UiCase::AccountLockout, site).await;
        assert!(result.is_ok());
        assert!(browser.submitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_power_management_skips_broken_paths() {
        let site = site()
            .broken("https://bmc/redfish/v1/Systems/system")
            .page("https://bmc/ui/#/system", FakePage::new("System", "<button>Power off</button>"));
        let (result, _) = run(UiCase::PowerManagement, site).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feature_page_missing_fails() {
        let (result, _) = run(UiCase::TemperatureMonitoring, site()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Temperature monitoring not found in the web UI"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_feature_page_requires_login() {
        let site = site()
            .accepts("root", "changed", DASHBOARD)
            .page("https://bmc/redfish/v1/", FakePage::new("", "{\"@odata.id\": \"/redfish/v1\"}"));
        let (result, _) = run(UiCase::RedfishApiAccess, site).await;
        assert_eq!(result.unwrap_err().to_string(), "Failed to log in");
    }

    #[tokio::test(start_paused = true)]
    async fn test_inventory_by_label() {
        let site = site().page(
            DASHBOARD,
            FakePage::new("OpenBMC", "").with_element(FakeElement::labelled("Hardware")),
        );
        let (result, _) = run(UiCase::InventoryDisplay, site).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inventory_unclickable_label_still_counts() {
        let site = site().page(
            DASHBOARD,
            FakePage::new("OpenBMC", "").with_element(FakeElement::labelled("CPU").unclickable()),
        );
        let (result, _) = run(UiCase::InventoryDisplay, site).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inventory_url_fallback() {
        let site = site().page(
            "https://bmc/ui/inventory",
            FakePage::new("Inventory", "<td>Processor 0</td>"),
        );
        let (result, _) = run(UiCase::InventoryDisplay, site).await;
        assert!(result.is_ok());

        let (result, _) = run(UiCase::InventoryDisplay, self::site()).await;
        assert!(result.is_err());
    }
}
