//! W3C WebDriver client
//!
//! Speaks the JSON wire protocol of a WebDriver server (chromedriver by
//! default). Every response is wrapped in `{"value": ...}`; failures carry
//! `{"value": {"error": ..., "message": ...}}` with a non-2xx status.

use async_trait::async_trait;
use bmcprobe_config::domains::webui::BrowserConfig;
use bmcprobe_http::{build_client, HttpConfig, HttpMethod};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::browser::{Browser, BrowserLauncher, ElementRef, Locator};
use crate::error::{Result, WebUiError};

/// Key under which W3C drivers return element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const NO_SUCH_ELEMENT: &str = "no such element";

/// `capabilities` body for a new Chrome/Chromium session
pub fn chrome_capabilities(browser: &BrowserConfig) -> Value {
    let mut args = browser.args.clone();
    if browser.headless && !args.iter().any(|arg| arg.starts_with("--headless")) {
        args.push("--headless=new".to_string());
    }

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "acceptInsecureCerts": true,
                "goog:chromeOptions": {
                    "binary": browser.binary,
                    "args": args,
                }
            }
        }
    })
}

#[derive(Clone)]
struct Wire {
    client: Client,
    base_url: String,
}

impl Wire {
    async fn command(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("WebDriver {} {}", method, path);

        let mut request = self.client.request(method.into(), &url);
        if let Some(body) = body {
            request = request.json(&body);
        } else if method == HttpMethod::Post {
            request = request.json(&json!({}));
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| WebUiError::Protocol(format!("{} from {}: {}", e, path, text)))?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(WebUiError::WebDriver {
                status: status.as_u16(),
                error: value["error"].as_str().unwrap_or("unknown error").to_string(),
                message: value["message"].as_str().unwrap_or_default().to_string(),
            });
        }

        Ok(value)
    }
}

/// Connection to a WebDriver server that opens sessions on demand
#[derive(Clone)]
pub struct WebDriverClient {
    wire: Wire,
    capabilities: Value,
}

impl WebDriverClient {
    /// Driver commands share the run's `http` settings
    pub fn new(webdriver_url: &str, browser: &BrowserConfig, http: &HttpConfig) -> Result<Self> {
        let client = build_client(http)?;
        Ok(Self::with_client(client, webdriver_url, chrome_capabilities(browser)))
    }

    pub fn with_client(client: Client, webdriver_url: &str, capabilities: Value) -> Self {
        Self {
            wire: Wire {
                client,
                base_url: webdriver_url.trim_end_matches('/').to_string(),
            },
            capabilities,
        }
    }

    /// Whether the server reports itself ready to create sessions
    pub async fn is_ready(&self) -> Result<bool> {
        let value = self.wire.command(HttpMethod::Get, "/status", None).await?;
        Ok(value["ready"].as_bool().unwrap_or(false))
    }

    pub async fn new_session(&self) -> Result<WebDriverSession> {
        let value = self
            .wire
            .command(HttpMethod::Post, "/session", Some(self.capabilities.clone()))
            .await?;
        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| WebUiError::Protocol("new session response lacks sessionId".to_string()))?
            .to_string();

        info!("WebDriver session {} started", session_id);
        Ok(WebDriverSession {
            wire: self.wire.clone(),
            session_id,
        })
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverClient {
    async fn launch(&self) -> Result<Box<dyn Browser>> {
        Ok(Box::new(self.new_session().await?))
    }
}

/// One browser session on the WebDriver server
pub struct WebDriverSession {
    wire: Wire,
    session_id: String,
}

impl WebDriverSession {
    pub fn id(&self) -> &str {
        &self.session_id
    }

    async fn session_command(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let path = format!("/session/{}{}", self.session_id, path);
        self.wire.command(method, &path, body).await
    }

    async fn string_command(&self, path: &str) -> Result<String> {
        let value = self.session_command(HttpMethod::Get, path, None).await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| WebUiError::Protocol(format!("{} did not return a string", path)))
    }

    async fn element_command(
        &self,
        method: HttpMethod,
        element: &ElementRef,
        action: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let path = format!("/element/{}/{}", element.0, action);
        self.session_command(method, &path, body).await
    }
}

fn locator_body(locator: &Locator) -> Value {
    json!({ "using": locator.strategy(), "value": locator.value() })
}

fn element_ref(value: &Value) -> Result<ElementRef> {
    value[ELEMENT_KEY]
        .as_str()
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| WebUiError::Protocol(format!("not an element reference: {}", value)))
}

#[async_trait]
impl Browser for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.session_command(HttpMethod::Post, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.session_command(HttpMethod::Post, "/refresh", None).await?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        self.string_command("/title").await
    }

    async fn current_url(&self) -> Result<String> {
        self.string_command("/url").await
    }

    async fn page_source(&self) -> Result<String> {
        self.string_command("/source").await
    }

    async fn find(&self, locator: &Locator) -> Result<ElementRef> {
        match self
            .session_command(HttpMethod::Post, "/element", Some(locator_body(locator)))
            .await
        {
            Ok(value) => element_ref(&value),
            Err(WebUiError::WebDriver { error, .. }) if error == NO_SUCH_ELEMENT => {
                Err(WebUiError::NoSuchElement(locator.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let value = self
            .session_command(HttpMethod::Post, "/elements", Some(locator_body(locator)))
            .await?;
        value
            .as_array()
            .map(|elements| elements.iter().map(element_ref).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let value = self
            .element_command(HttpMethod::Get, element, &format!("attribute/{}", name), None)
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.element_command(HttpMethod::Post, element, "clear", None)
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.element_command(
            HttpMethod::Post,
            element,
            "value",
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.element_command(HttpMethod::Post, element, "click", None)
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        let value = self
            .element_command(HttpMethod::Get, element, "text", None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn quit(&self) -> Result<()> {
        self.wire
            .command(
                HttpMethod::Delete,
                &format!("/session/{}", self.session_id),
                None,
            )
            .await?;
        info!("WebDriver session {} closed", self.session_id);
        Ok(())
    }
}
