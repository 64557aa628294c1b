//! In-process mock BMC and public API used by the integration tests

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const USERNAME: &str = "root";
pub const PASSWORD: &str = "0penBmc";
/// `Basic` credentials for root:0penBmc
const BASIC_CREDENTIALS: &str = "Basic cm9vdDowcGVuQm1j";

pub const SYSTEM_PATH: &str = "/redfish/v1/Systems/system";
pub const THERMAL_PATH: &str = "/redfish/v1/Chassis/chassis/Thermal";
pub const SESSIONS_PATH: &str = "/redfish/v1/SessionService/Sessions";

/// Sensor table printed by the fake `ipmitool`
pub const IPMI_SENSOR_LIST: &str =
    "CPU Temp         | 46.000     | degrees C  | ok\nDIMM A Temp      | 39.000     | degrees C  | ok\nFan 1            | 4200.000   | RPM        | ok\n";

/// How the mock BMC reacts
#[derive(Debug, Clone)]
pub struct BmcBehavior {
    pub initial_power: &'static str,
    /// System reads after a reset before the new state is reported
    pub transition_polls: u32,
    /// Accept resets without ever changing state
    pub power_stuck: bool,
    pub thermal: bool,
    /// `PowerState` override reported regardless of the real state
    pub reported_power: Option<&'static str>,
}

impl Default for BmcBehavior {
    fn default() -> Self {
        Self {
            initial_power: "Off",
            transition_polls: 2,
            power_stuck: false,
            thermal: true,
            reported_power: None,
        }
    }
}

struct BmcState {
    behavior: BmcBehavior,
    power: String,
    pending: Option<(String, u32)>,
    /// token -> session id
    sessions: HashMap<String, String>,
    next_session: u32,
    resets: Vec<String>,
    sessions_created: u32,
}

type Shared = Arc<Mutex<BmcState>>;

pub struct MockBmc {
    pub url: String,
    state: Shared,
}

impl MockBmc {
    pub async fn start(behavior: BmcBehavior) -> Self {
        let state = Arc::new(Mutex::new(BmcState {
            power: behavior.initial_power.to_string(),
            behavior,
            pending: None,
            sessions: HashMap::new(),
            next_session: 1,
            resets: Vec::new(),
            sessions_created: 0,
        }));

        let app = Router::new()
            .route("/redfish/v1/", get(service_root))
            .route(SESSIONS_PATH, post(create_session))
            .route("/redfish/v1/SessionService/Sessions/{id}", delete(delete_session))
            .route(SYSTEM_PATH, get(system))
            .route(
                "/redfish/v1/Systems/system/Actions/ComputerSystem.Reset",
                post(reset),
            )
            .route(THERMAL_PATH, get(thermal))
            .with_state(Arc::clone(&state));

        Self {
            url: serve(app).await,
            state,
        }
    }

    /// `ResetType` values received, in order
    pub fn resets(&self) -> Vec<String> {
        self.state.lock().unwrap().resets.clone()
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    pub fn sessions_created(&self) -> u32 {
        self.state.lock().unwrap().sessions_created
    }

    pub fn power(&self) -> String {
        self.state.lock().unwrap().power.clone()
    }
}

/// Serve `app` on an ephemeral localhost port and return its base URL
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

/// Posts list and weather endpoints standing in for the public APIs
pub async fn start_public_api() -> String {
    let app = Router::new()
        .route(
            "/posts",
            get(|| async {
                Json(json!([
                    {"userId": 1, "id": 1, "title": "first"},
                    {"userId": 1, "id": 2, "title": "second"}
                ]))
            }),
        )
        .route(
            "/weather",
            get(|| async {
                Json(json!({
                    "current_condition": [{"temp_C": "-12", "weatherDesc": [{"value": "Snow"}]}],
                    "nearest_area": [{"areaName": [{"value": "Novosibirsk"}]}]
                }))
            }),
        );
    serve(app).await
}

fn authorized(state: &BmcState, headers: &HeaderMap) -> bool {
    let basic = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(BASIC_CREDENTIALS);
    let token = headers
        .get("x-auth-token")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| state.sessions.contains_key(token));
    basic || token
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": "Base.1.8.GeneralError", "message": "Unauthorized"}})),
    )
        .into_response()
}

async fn service_root() -> Json<Value> {
    Json(json!({
        "@odata.id": "/redfish/v1/",
        "@odata.type": "#ServiceRoot.v1_5_0.ServiceRoot",
        "Id": "RootService",
        "Name": "Root Service",
        "RedfishVersion": "1.9.0",
        "Systems": {"@odata.id": "/redfish/v1/Systems"},
        "Chassis": {"@odata.id": "/redfish/v1/Chassis"},
        "Managers": {"@odata.id": "/redfish/v1/Managers"},
        "SessionService": {"@odata.id": "/redfish/v1/SessionService"}
    }))
}

async fn create_session(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["UserName"] != USERNAME || body["Password"] != PASSWORD {
        return unauthorized();
    }

    let mut state = state.lock().unwrap();
    let id = format!("session{}", state.next_session);
    let token = format!("token-{}", state.next_session);
    state.next_session += 1;
    state.sessions_created += 1;
    state.sessions.insert(token.clone(), id.clone());

    let mut headers = HeaderMap::new();
    headers.insert("x-auth-token", token.parse().unwrap());
    headers.insert(
        "location",
        format!("{}/{}", SESSIONS_PATH, id).parse().unwrap(),
    );
    (
        StatusCode::CREATED,
        headers,
        Json(json!({
            "@odata.id": format!("{}/{}", SESSIONS_PATH, id),
            "Id": id,
            "UserName": USERNAME
        })),
    )
        .into_response()
}

async fn delete_session(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let before = state.sessions.len();
    state.sessions.retain(|_, session_id| *session_id != id);
    if state.sessions.len() < before {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn system(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    if let Some((target, remaining)) = state.pending.take() {
        if remaining <= 1 {
            state.power = target;
        } else {
            state.pending = Some((target, remaining - 1));
        }
    }

    let power = state
        .behavior
        .reported_power
        .map(String::from)
        .unwrap_or_else(|| state.power.clone());
    Json(json!({
        "@odata.id": SYSTEM_PATH,
        "Id": "system",
        "Name": "system",
        "Manufacturer": "OpenBMC",
        "Model": "QEMU",
        "SerialNumber": "0000",
        "PowerState": power,
        "Status": {"Health": "OK", "State": "Enabled"}
    }))
    .into_response()
}

async fn reset(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let reset_type = body["ResetType"].as_str().unwrap_or_default().to_string();
    let target = match reset_type.as_str() {
        "On" | "ForceOn" => "On",
        "ForceOff" | "GracefulShutdown" => "Off",
        _ => return StatusCode::BAD_REQUEST.into_response(),
    };
    state.resets.push(reset_type);

    if !state.behavior.power_stuck {
        if state.behavior.transition_polls == 0 {
            state.power = target.to_string();
        } else {
            state.pending = Some((target.to_string(), state.behavior.transition_polls));
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

fn sensor(index: u32, name: &str, context: &str, celsius: f64) -> Value {
    json!({
        "@odata.id": format!("{}#/Temperatures/{}", THERMAL_PATH, index),
        "MemberId": index.to_string(),
        "Name": name,
        "SensorNumber": index + 1,
        "ReadingCelsius": celsius,
        "PhysicalContext": context,
        "UpperThresholdCritical": 90.0,
        "UpperThresholdFatal": 100.0,
        "MinReadingRange": 0.0,
        "MaxReadingRange": 120.0,
        "Status": {"Health": "OK", "State": "Enabled"}
    })
}

async fn thermal(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if !state.behavior.thermal {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(json!({
        "@odata.id": THERMAL_PATH,
        "Id": "Thermal",
        "Name": "Thermal",
        "Temperatures": [
            sensor(0, "CPU Temp", "CPU", 45.0),
            sensor(1, "DIMM A Temp", "SystemBoard", 38.0)
        ]
    }))
    .into_response()
}
