//! Login form handling, interface discovery and page probing

use bmcprobe_resilience::{PollPolicy, Poller};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{Browser, ElementRef, Locator};
use crate::error::{Result, WebUiError};

pub const USERNAME_FIELD: &str = "#username";
pub const PASSWORD_FIELD: &str = "#password";

/// Tried in order before falling back to the first button
pub const LOGIN_BUTTON_SELECTORS: &[&str] = &[
    "button[type='submit']",
    "button.btn-login",
    "input[type='submit']",
    ".login-button",
];

/// Any of these in the title or source marks a page as a BMC interface
pub const INTERFACE_INDICATORS: &[&str] = &[
    "openbmc",
    "bmc",
    "login",
    "authorization",
    "username",
    "password",
    "phosphor",
    "redfish",
];

const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Locate the control that submits the login form
pub async fn find_login_button(browser: &dyn Browser) -> Result<ElementRef> {
    for selector in LOGIN_BUTTON_SELECTORS {
        match browser.find(&Locator::css(*selector)).await {
            Ok(element) => return Ok(element),
            Err(WebUiError::NoSuchElement(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    if let Some(button) = browser.find_all(&Locator::tag("button")).await?.into_iter().next() {
        return Ok(button);
    }

    for input in browser.find_all(&Locator::tag("input")).await? {
        if browser.attribute(&input, "type").await?.as_deref() == Some("submit") {
            return Ok(input);
        }
    }

    Err(WebUiError::NoSuchElement("login button".to_string()))
}

/// Fill both login fields and click the login control
pub async fn submit_credentials(browser: &dyn Browser, username: &str, password: &str) -> Result<()> {
    let username_field = browser.find(&Locator::css(USERNAME_FIELD)).await?;
    let password_field = browser.find(&Locator::css(PASSWORD_FIELD)).await?;
    let button = find_login_button(browser).await?;

    browser.clear(&username_field).await?;
    browser.send_keys(&username_field, username).await?;
    browser.clear(&password_field).await?;
    browser.send_keys(&password_field, password).await?;
    browser.click(&button).await?;

    debug!("Submitted credentials for {}", username);
    Ok(())
}

/// First candidate URL that looks like a BMC web interface
pub async fn discover(browser: &dyn Browser, urls: &[String], page_load: Duration) -> Result<String> {
    for url in urls {
        match looks_like_interface(browser, url, page_load).await {
            Ok(Some(indicator)) => {
                info!("Web interface found at {} ({})", url, indicator);
                return Ok(url.clone());
            }
            Ok(None) => debug!("{} does not look like a BMC interface", url),
            Err(e) => warn!("Probing {} failed: {}", url, e),
        }
    }

    Err(WebUiError::InterfaceNotFound(urls.join(", ")))
}

async fn looks_like_interface(
    browser: &dyn Browser,
    url: &str,
    page_load: Duration,
) -> Result<Option<&'static str>> {
    browser.goto(url).await?;
    sleep(page_load).await;

    let title = browser.title().await?.to_lowercase();
    let source = browser.page_source().await?.to_lowercase();
    Ok(INTERFACE_INDICATORS
        .iter()
        .copied()
        .find(|indicator| title.contains(indicator) || source.contains(indicator)))
}

/// Visit `base_url` + each path until a page source mentions an indicator
///
/// Navigation errors skip to the next path.
pub async fn find_page_mentioning(
    browser: &dyn Browser,
    base_url: &str,
    paths: &[&str],
    indicators: &[&str],
    page_load: Duration,
) -> Option<String> {
    for path in paths {
        let url = format!("{}{}", base_url, path);
        let source = async {
            browser.goto(&url).await?;
            sleep(page_load).await;
            browser.page_source().await
        }
        .await;

        match source {
            Ok(source) => {
                let source = source.to_lowercase();
                if indicators.iter().any(|indicator| source.contains(indicator)) {
                    info!("Found expected content at {}", url);
                    return Some(url);
                }
            }
            Err(e) => debug!("Loading {} failed: {}", url, e),
        }
    }
    None
}

/// Wait up to `timeout` for `locator` to match at least one element
pub async fn wait_for_element(
    browser: &dyn Browser,
    locator: &Locator,
    timeout: Duration,
) -> Result<Option<ElementRef>> {
    let attempts = (timeout.as_millis() / ELEMENT_POLL_INTERVAL.as_millis()).max(1) as u32;
    let poller = Poller::new(PollPolicy::fixed(attempts, ELEMENT_POLL_INTERVAL));

    match poller
        .poll_until(
            |_| async move { browser.find_all(locator).await },
            |elements| !elements.is_empty(),
        )
        .await
    {
        Ok(success) => Ok(success.value.into_iter().next()),
        Err(bmcprobe_resilience::PollError::Exhausted { .. }) => Ok(None),
        Err(bmcprobe_resilience::PollError::Probe { error, .. }) => Err(error),
    }
}
