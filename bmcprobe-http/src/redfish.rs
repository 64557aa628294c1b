//! Redfish API seam and its reqwest implementation

use crate::client::build_client;
use crate::errors::HttpError;
use crate::HttpConfig;
use crate::types::{ApiResponse, HttpMethod};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Well-known Redfish resource paths
pub mod paths {
    pub const SERVICE_ROOT: &str = "/redfish/v1/";
    pub const SESSIONS: &str = "/redfish/v1/SessionService/Sessions";

    pub fn session(id: &str) -> String {
        format!("{}/{}", SESSIONS, id)
    }

    pub fn reset_action(system_path: &str) -> String {
        format!(
            "{}/Actions/ComputerSystem.Reset",
            system_path.trim_end_matches('/')
        )
    }
}

/// Credentials attached to each request
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    /// `X-Auth-Token` from a Redfish session
    Token(String),
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => write!(f, "None"),
            Auth::Basic { username, .. } => write!(f, "Basic({}:***)", username),
            Auth::Token(_) => write!(f, "Token(***)"),
        }
    }
}

/// Session created through the Redfish session service
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub token: String,
}

impl Session {
    /// Token from `X-Auth-Token`, falling back to `AuthToken`
    pub fn token_from(response: &ApiResponse) -> Option<&str> {
        response
            .header("X-Auth-Token")
            .or_else(|| response.header("AuthToken"))
    }

    /// Session from a create-session response; the status is not checked here
    pub fn from_response(response: &ApiResponse) -> Result<Self, HttpError> {
        let body = response.json()?;
        let id = body
            .get("Id")
            .and_then(Value::as_str)
            .ok_or(HttpError::IncompleteSession("Id"))?
            .to_string();
        let token = Self::token_from(response)
            .ok_or(HttpError::IncompleteSession("X-Auth-Token"))?
            .to_string();

        Ok(Self { id, token })
    }

    pub fn auth(&self) -> Auth {
        Auth::Token(self.token.clone())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("token", &"***")
            .finish()
    }
}

/// Minimal Redfish surface the suites need
///
/// Non-2xx statuses are returned as responses, not errors; only transport
/// failures are `Err`.
#[async_trait]
pub trait RedfishApi: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse, HttpError>;

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, HttpError>;

    async fn delete(&self, path: &str) -> Result<ApiResponse, HttpError>;

    /// Same endpoint with different credentials
    fn with_auth(&self, auth: Auth) -> Box<dyn RedfishApi>;

    async fn create_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiResponse, HttpError> {
        self.post(
            paths::SESSIONS,
            &json!({ "UserName": username, "Password": password }),
        )
        .await
    }

    async fn delete_session(&self, id: &str) -> Result<ApiResponse, HttpError> {
        self.delete(&paths::session(id)).await
    }
}

/// reqwest-backed Redfish client
#[derive(Clone)]
pub struct RedfishClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl RedfishClient {
    pub fn new(base_url: &str, config: &HttpConfig, auth: Auth) -> Result<Self, HttpError> {
        Self::from_client(build_client(config)?, base_url, auth)
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client, base_url: &str, auth: Auth) -> Result<Self, HttpError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| HttpError::bad_target(base_url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpError::bad_target(base_url, "scheme must be http or https"));
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Absolute URLs pass through untouched
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, HttpError> {
        let url = self.url(path);
        debug!("{} {} ({:?})", method, url, self.auth);

        let mut request = self.client.request(method.into(), &url);
        request = match &self.auth {
            Auth::None => request,
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Token(token) => request.header("X-Auth-Token", token),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        info!("{} {} -> {}", method, path, status);
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

impl fmt::Debug for RedfishClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedfishClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish()
    }
}

#[async_trait]
impl RedfishApi for RedfishClient {
    async fn get(&self, path: &str) -> Result<ApiResponse, HttpError> {
        self.execute(HttpMethod::Get, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, HttpError> {
        self.execute(HttpMethod::Post, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, HttpError> {
        self.execute(HttpMethod::Delete, path, None).await
    }

    fn with_auth(&self, auth: Auth) -> Box<dyn RedfishApi> {
        Box::new(Self {
            auth,
            ..self.clone()
        })
    }
}
