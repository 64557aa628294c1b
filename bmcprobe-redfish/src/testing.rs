//! Scripted in-memory Redfish service for unit tests

use async_trait::async_trait;
use bmcprobe_http::{ApiResponse, Auth, HttpError, HttpMethod, RedfishApi};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub auth: Auth,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    routes: HashMap<(HttpMethod, String), VecDeque<ApiResponse>>,
    calls: Vec<RecordedCall>,
}

/// Routes answer in order and the last response repeats; unrouted paths get 404.
/// Clones share routes and the call log.
#[derive(Clone, Default)]
pub struct FakeRedfish {
    state: Arc<Mutex<State>>,
    auth: Auth,
}

impl FakeRedfish {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, method: HttpMethod, path: &str, response: ApiResponse) -> Self {
        self.route_sequence(method, path, vec![response])
    }

    pub fn route_json(self, method: HttpMethod, path: &str, status: u16, body: Value) -> Self {
        self.route(method, path, ApiResponse::json_body(status, &body))
    }

    pub fn route_sequence(self, method: HttpMethod, path: &str, responses: Vec<ApiResponse>) -> Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert((method, path.to_string()), responses.into());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|call| call.path == path).count()
    }

    pub fn bodies_sent_to(&self, path: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .filter_map(|call| call.body)
            .collect()
    }

    fn respond(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> ApiResponse {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            auth: self.auth.clone(),
            body: body.cloned(),
        });

        match state.routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => ApiResponse::new(404, "Not Found"),
        }
    }
}

#[async_trait]
impl RedfishApi for FakeRedfish {
    async fn get(&self, path: &str) -> Result<ApiResponse, HttpError> {
        Ok(self.respond(HttpMethod::Get, path, None))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, HttpError> {
        Ok(self.respond(HttpMethod::Post, path, Some(body)))
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, HttpError> {
        Ok(self.respond(HttpMethod::Delete, path, None))
    }

    fn with_auth(&self, auth: Auth) -> Box<dyn RedfishApi> {
        Box::new(Self {
            state: Arc::clone(&self.state),
            auth,
        })
    }
}
