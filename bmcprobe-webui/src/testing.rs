//! Scripted browser for unit tests
//!
//! A [`FakeSite`] maps URLs to pages with a fixed title, source and element
//! list. Clicking a submit element checks the typed credentials and moves to
//! the landing URL when they match.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::browser::{Browser, BrowserLauncher, ElementRef, Locator};
use crate::error::{Result, WebUiError};
use crate::login::{PASSWORD_FIELD, USERNAME_FIELD};

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Field,
    Submit,
    Inert,
    Unclickable,
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    locator: Locator,
    id: String,
    text: String,
    attributes: HashMap<String, String>,
    action: Action,
}

impl FakeElement {
    fn new(locator: Locator, action: Action) -> Self {
        Self {
            id: locator.value().to_string(),
            locator,
            text: String::new(),
            attributes: HashMap::new(),
            action,
        }
    }

    pub fn input(locator: impl Into<Locator>) -> Self {
        Self::new(locator.into(), Action::Field)
    }

    pub fn submit(locator: impl Into<Locator>) -> Self {
        Self::new(locator.into(), Action::Submit)
    }

    /// Element found by [`Locator::containing_text`]
    pub fn labelled(text: &str) -> Self {
        let mut element = Self::new(Locator::containing_text(text), Action::Inert);
        element.id = text.to_string();
        element.text = text.to_string();
        element
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn unclickable(mut self) -> Self {
        self.action = Action::Unclickable;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    title: String,
    source: String,
    elements: Vec<FakeElement>,
}

impl FakePage {
    pub fn new(title: &str, source: &str) -> Self {
        Self {
            title: title.to_string(),
            source: source.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Standard `#username`/`#password` form with a submit button
    pub fn login_form(title: &str) -> Self {
        Self::new(title, "<form>username password</form>")
            .with_element(FakeElement::input(USERNAME_FIELD))
            .with_element(FakeElement::input(PASSWORD_FIELD))
            .with_element(FakeElement::submit("button[type='submit']"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    redirects: HashMap<String, String>,
    broken: Vec<String>,
    credentials: Option<(String, String)>,
    landing_url: Option<String>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Navigating here fails with a driver error
    pub fn broken(mut self, url: &str) -> Self {
        self.broken.push(url.to_string());
        self
    }

    /// Submitting these credentials moves the browser to `landing_url`
    pub fn accepts(mut self, username: &str, password: &str, landing_url: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self.landing_url = Some(landing_url.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct BrowserState {
    current_url: String,
    values: HashMap<String, String>,
    submitted: Vec<(String, String)>,
    quit: bool,
}

#[derive(Clone)]
pub struct FakeBrowser {
    site: Arc<FakeSite>,
    state: Arc<Mutex<BrowserState>>,
}

impl FakeBrowser {
    pub fn new(site: FakeSite) -> Self {
        Self::shared(Arc::new(site))
    }

    fn shared(site: Arc<FakeSite>) -> Self {
        Self {
            site,
            state: Arc::default(),
        }
    }

    /// Every `(username, password)` pair submitted so far
    pub fn submitted(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn is_quit(&self) -> bool {
        self.state.lock().unwrap().quit
    }

    fn current_page(&self) -> FakePage {
        let url = self.state.lock().unwrap().current_url.clone();
        self.site.pages.get(&url).cloned().unwrap_or_default()
    }

    fn element(&self, element: &ElementRef) -> Result<FakeElement> {
        self.current_page()
            .elements
            .into_iter()
            .find(|candidate| candidate.id == element.0)
            .ok_or_else(|| WebUiError::WebDriver {
                status: 404,
                error: "stale element reference".to_string(),
                message: element.0.clone(),
            })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.lock().unwrap().quit {
            return Err(WebUiError::WebDriver {
                status: 404,
                error: "invalid session id".to_string(),
                message: "session deleted".to_string(),
            });
        }
        Ok(())
    }

    fn submit(&self) {
        let mut state = self.state.lock().unwrap();
        let username = state.values.get(USERNAME_FIELD).cloned().unwrap_or_default();
        let password = state.values.get(PASSWORD_FIELD).cloned().unwrap_or_default();
        state.submitted.push((username.clone(), password.clone()));

        if let (Some((expected_user, expected_password)), Some(landing)) =
            (&self.site.credentials, &self.site.landing_url)
        {
            if *expected_user == username && *expected_password == password {
                state.current_url = landing.clone();
                state.values.clear();
            }
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        if self.site.broken.iter().any(|broken| broken == url) {
            return Err(WebUiError::WebDriver {
                status: 500,
                error: "unknown error".to_string(),
                message: format!("net::ERR_CONNECTION_REFUSED at {}", url),
            });
        }

        let target = self.site.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        let mut state = self.state.lock().unwrap();
        state.current_url = target;
        state.values.clear();
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.ensure_open()?;
        self.state.lock().unwrap().values.clear();
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.current_page().title)
    }

    async fn current_url(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn page_source(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.current_page().source)
    }

    async fn find(&self, locator: &Locator) -> Result<ElementRef> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WebUiError::NoSuchElement(locator.to_string()))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.ensure_open()?;
        Ok(self
            .current_page()
            .elements
            .into_iter()
            .filter(|element| element.locator == *locator)
            .map(|element| ElementRef(element.id))
            .collect())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attributes.get(name).cloned())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        self.state.lock().unwrap().values.remove(&element.0);
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.element(element)?;
        self.state
            .lock()
            .unwrap()
            .values
            .entry(element.0.clone())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        match self.element(element)?.action {
            Action::Submit => self.submit(),
            Action::Unclickable => {
                return Err(WebUiError::WebDriver {
                    status: 400,
                    error: "element not interactable".to_string(),
                    message: element.0.clone(),
                })
            }
            Action::Field | Action::Inert => {}
        }
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        Ok(self.element(element)?.text)
    }

    async fn quit(&self) -> Result<()> {
        self.state.lock().unwrap().quit = true;
        Ok(())
    }
}

/// Hands out a fresh [`FakeBrowser`] per launch and keeps them for inspection
#[derive(Clone, Default)]
pub struct FakeLauncher {
    site: Arc<FakeSite>,
    launched: Arc<Mutex<Vec<FakeBrowser>>>,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            launched: Arc::default(),
        }
    }

    pub fn browsers(&self) -> Vec<FakeBrowser> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn Browser>> {
        let browser = FakeBrowser::shared(Arc::clone(&self.site));
        self.launched.lock().unwrap().push(browser.clone());
        Ok(Box::new(browser))
    }
}
