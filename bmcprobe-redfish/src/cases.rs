//! The functional cases
//!
//! Every case takes a [`SuiteContext`] and yields a [`CaseOutcome`]. Hard
//! assertion failures surface as `Err` and are turned into
//! [`CaseOutcome::Failed`] by the runner; unmet preconditions (no thermal
//! resource, no IPMI data) come back as [`CaseOutcome::Skipped`].

use bmcprobe_core::checks::{
    check_sensor_structure, check_system_structure, endpoint_availability, is_cpu_sensor,
    normal_range_for, require_fields, SERVICE_ROOT_REQUIRED, THERMAL_REQUIRED,
};
use bmcprobe_core::sensors::cross_check;
use bmcprobe_core::{CaseOutcome, ComputerSystem, PowerState, ServiceRoot, Thermal};
use bmcprobe_http::{paths, Auth, RedfishApi, Session};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{expect_status, RedfishError, Result};
use crate::ipmi::{parse_sensor_list, IpmiTool};
use crate::power::{PowerVerifier, TransitionOutcome};
use crate::settings::SuiteSettings;
use crate::thermal::{fetch_thermal, ThermalFetch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseId {
    Authentication,
    SystemInfo,
    PowerOn,
    PowerOff,
    CpuTemperatureRange,
    TemperatureSensorStructure,
    RedfishVsIpmi,
    ServiceRoot,
    PowerStateIdempotent,
    SessionRoundTrip,
}

impl CaseId {
    /// Every case in execution order
    pub const ALL: [CaseId; 10] = [
        CaseId::Authentication,
        CaseId::SystemInfo,
        CaseId::PowerOn,
        CaseId::PowerOff,
        CaseId::CpuTemperatureRange,
        CaseId::TemperatureSensorStructure,
        CaseId::RedfishVsIpmi,
        CaseId::ServiceRoot,
        CaseId::PowerStateIdempotent,
        CaseId::SessionRoundTrip,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CaseId::Authentication => "redfish_authentication",
            CaseId::SystemInfo => "system_info",
            CaseId::PowerOn => "power_on",
            CaseId::PowerOff => "power_off",
            CaseId::CpuTemperatureRange => "cpu_temperature_range",
            CaseId::TemperatureSensorStructure => "temperature_sensor_structure",
            CaseId::RedfishVsIpmi => "redfish_vs_ipmi",
            CaseId::ServiceRoot => "service_root",
            CaseId::PowerStateIdempotent => "power_state_idempotent",
            CaseId::SessionRoundTrip => "session_round_trip",
        }
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CaseId {
    type Err = RedfishError;

    fn from_str(s: &str) -> Result<Self> {
        CaseId::ALL
            .iter()
            .copied()
            .find(|case| case.name() == s)
            .ok_or_else(|| RedfishError::UnknownCase(s.to_string()))
    }
}

/// Handles shared by every case
pub struct SuiteContext<'a> {
    /// Authenticated client
    pub api: &'a dyn RedfishApi,
    pub ipmi: &'a dyn IpmiTool,
    pub settings: &'a SuiteSettings,
}

pub async fn run_case(case: CaseId, ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    match case {
        CaseId::Authentication => authentication(ctx).await,
        CaseId::SystemInfo => system_info(ctx).await,
        CaseId::PowerOn => power_transition(ctx, PowerState::On).await,
        CaseId::PowerOff => power_transition(ctx, PowerState::Off).await,
        CaseId::CpuTemperatureRange => cpu_temperature_range(ctx).await,
        CaseId::TemperatureSensorStructure => temperature_sensor_structure(ctx).await,
        CaseId::RedfishVsIpmi => redfish_vs_ipmi(ctx).await,
        CaseId::ServiceRoot => service_root(ctx).await,
        CaseId::PowerStateIdempotent => power_state_idempotent(ctx).await,
        CaseId::SessionRoundTrip => session_round_trip(ctx).await,
    }
}

async fn authentication(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let anonymous = ctx.api.with_auth(Auth::None);
    let response = anonymous
        .create_session(&ctx.settings.username, &ctx.settings.password)
        .await?;
    expect_status(&response, paths::SESSIONS, &[201])?;

    let session = Session::from_response(&response)?;
    info!("Session {} created", session.id);

    let cleanup = anonymous
        .with_auth(session.auth())
        .delete_session(&session.id)
        .await;
    match cleanup {
        Ok(response) if response.is_success() => info!("Session {} deleted", session.id),
        Ok(response) => warn!(
            "Deleting session {} returned {}",
            session.id, response.status
        ),
        Err(e) => warn!("Deleting session {} failed: {}", session.id, e),
    }

    Ok(CaseOutcome::Passed)
}

async fn system_info(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let path = &ctx.settings.system_path;
    let response = ctx.api.get(path).await?;
    expect_status(&response, path, &[200])?;

    let body = response.json()?;
    check_system_structure(&body)?;

    let system = ComputerSystem::from_value(&body)?;
    info!(
        "System: {} {}, power {}",
        system.manufacturer.as_deref().unwrap_or("N/A"),
        system.model.as_deref().unwrap_or("N/A"),
        system.power_state.as_deref().unwrap_or("N/A")
    );

    Ok(CaseOutcome::Passed)
}

async fn power_transition(ctx: &SuiteContext<'_>, target: PowerState) -> Result<CaseOutcome> {
    let verifier = PowerVerifier::new(ctx.api, &ctx.settings.system_path, &ctx.settings.power);
    match verifier.transition(target).await? {
        TransitionOutcome::AlreadyInState => Ok(CaseOutcome::skipped(format!(
            "System already {}",
            target
        ))),
        TransitionOutcome::Confirmed { .. } => Ok(CaseOutcome::Passed),
    }
}

/// Thermal body, or the skip outcome when it cannot be fetched
async fn thermal_body(ctx: &SuiteContext<'_>) -> Result<std::result::Result<Value, CaseOutcome>> {
    let fetch = fetch_thermal(
        ctx.api,
        &ctx.settings.thermal_path,
        &ctx.settings.thermal_fallback_path,
    )
    .await?;

    Ok(match fetch {
        ThermalFetch::Available { body, .. } => Ok(body),
        ThermalFetch::Unavailable { path, status } => Err(CaseOutcome::skipped(format!(
            "Thermal data unavailable ({} from {})",
            status, path
        ))),
    })
}

async fn cpu_temperature_range(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let body = match thermal_body(ctx).await? {
        Ok(body) => body,
        Err(skip) => return Ok(skip),
    };
    if body.get("Temperatures").is_none() {
        return Ok(CaseOutcome::skipped("No temperature data in thermal resource"));
    }

    let thermal = Thermal::from_value(&body)?;
    let cpu_sensors: Vec<_> = thermal
        .temperatures
        .iter()
        .filter(|sensor| is_cpu_sensor(sensor))
        .collect();
    if cpu_sensors.is_empty() {
        return Err(RedfishError::Assertion(
            "No CPU temperature sensors found".to_string(),
        ));
    }

    let mut out_of_range = Vec::new();
    for sensor in cpu_sensors {
        let name = sensor.display_name();
        let celsius = sensor.reading_celsius.ok_or_else(|| {
            RedfishError::Assertion(format!("Sensor '{}' has no ReadingCelsius", name))
        })?;

        let range = normal_range_for(name);
        if range.contains(celsius) {
            info!("{}: {}°C (normal {}-{}°C)", name, celsius, range.min, range.max);
        } else {
            out_of_range.push(format!(
                "{} at {}°C (normal {}-{}°C)",
                name, celsius, range.min, range.max
            ));
        }

        if let Some(status) = &sensor.status {
            if !status.is_healthy() {
                warn!(
                    "{} health is {}",
                    name,
                    status.health.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    if out_of_range.is_empty() {
        Ok(CaseOutcome::Passed)
    } else {
        Err(RedfishError::Assertion(format!(
            "Temperatures out of range: {}",
            out_of_range.join(", ")
        )))
    }
}

async fn temperature_sensor_structure(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let body = match thermal_body(ctx).await? {
        Ok(body) => body,
        Err(skip) => return Ok(skip),
    };
    require_fields(&body, "Thermal", THERMAL_REQUIRED)?;

    let sensors = body["Temperatures"].as_array().cloned().unwrap_or_default();
    let mut healthy = 0;
    for sensor in &sensors {
        let structure = check_sensor_structure(sensor)?;
        if !structure.missing_recommended.is_empty() {
            warn!(
                "{} is missing recommended fields: {}",
                structure.name,
                structure.missing_recommended.join(", ")
            );
        }
        if structure.healthy {
            healthy += 1;
        }
    }

    info!("{} of {} temperature sensors healthy", healthy, sensors.len());
    Ok(CaseOutcome::Passed)
}

async fn redfish_vs_ipmi(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let body = match thermal_body(ctx).await? {
        Ok(body) => body,
        Err(skip) => return Ok(skip),
    };
    let redfish = Thermal::from_value(&body)?.readings();
    if redfish.is_empty() {
        return Ok(CaseOutcome::skipped("No Redfish temperature readings"));
    }

    let output = match ctx.ipmi.sensor_list().await {
        Ok(output) => output,
        Err(e) => return Ok(CaseOutcome::skipped(format!("IPMI unavailable: {}", e))),
    };
    let ipmi = parse_sensor_list(&output);
    if ipmi.is_empty() {
        return Ok(CaseOutcome::skipped("No IPMI temperature readings"));
    }

    let policy = &ctx.settings.match_policy;
    let report = cross_check(&redfish, &ipmi, policy);
    for pair in &report.pairs {
        info!(
            "{} ({}°C) ~ {} ({}°C): diff {:.1}°C{}",
            pair.redfish_name,
            pair.redfish_celsius,
            pair.ipmi_name,
            pair.ipmi_celsius,
            pair.difference,
            if pair.within_tolerance { "" } else { " OUT OF TOLERANCE" }
        );
    }
    if !report.unmatched.is_empty() {
        info!("Unmatched Redfish sensors: {}", report.unmatched.join(", "));
    }

    let Some(ratio) = report.match_ratio() else {
        return Ok(CaseOutcome::skipped("No sensors matched between Redfish and IPMI"));
    };
    info!(
        "{}/{} sensors within {}°C ({:.0}%)",
        report.matching(),
        report.compared(),
        policy.tolerance_celsius,
        ratio * 100.0
    );

    if report.passes(policy) {
        Ok(CaseOutcome::Passed)
    } else {
        Ok(CaseOutcome::failed(format!(
            "Only {}/{} sensors agree within {}°C ({:.0}% < {:.0}%)",
            report.matching(),
            report.compared(),
            policy.tolerance_celsius,
            ratio * 100.0,
            policy.min_match_ratio * 100.0
        )))
    }
}

async fn service_root(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let response = ctx.api.get(paths::SERVICE_ROOT).await?;
    expect_status(&response, paths::SERVICE_ROOT, &[200])?;

    let body = response.json()?;
    require_fields(&body, "ServiceRoot", SERVICE_ROOT_REQUIRED)?;
    let root = ServiceRoot::from_value(&body)?;
    info!(
        "Redfish version {}",
        root.redfish_version.as_deref().unwrap_or("unknown")
    );

    let availability = endpoint_availability(&root);
    for (endpoint, odata_id) in &availability.available {
        info!("{} -> {}", endpoint, odata_id);
    }
    if !availability.missing.is_empty() {
        warn!("Missing endpoints: {}", availability.missing.join(", "));
    }

    if availability.passes() {
        Ok(CaseOutcome::Passed)
    } else {
        Ok(CaseOutcome::failed(format!(
            "Only {}/{} expected endpoints available",
            availability.count(),
            availability.total()
        )))
    }
}

async fn power_state_idempotent(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let verifier = PowerVerifier::new(ctx.api, &ctx.settings.system_path, &ctx.settings.power);
    let first = verifier.current_state().await?;
    let second = verifier.current_state().await?;

    if first == second {
        info!(
            "PowerState stable at {}",
            first.as_deref().unwrap_or("unknown")
        );
        Ok(CaseOutcome::Passed)
    } else {
        Ok(CaseOutcome::failed(format!(
            "PowerState changed between reads: {:?} then {:?}",
            first, second
        )))
    }
}

async fn session_round_trip(ctx: &SuiteContext<'_>) -> Result<CaseOutcome> {
    let anonymous = ctx.api.with_auth(Auth::None);
    let settings = ctx.settings;

    let first = open_session(anonymous.as_ref(), settings).await?;
    let path = paths::session(&first.id);
    let response = anonymous
        .with_auth(first.auth())
        .delete_session(&first.id)
        .await?;
    expect_status(&response, &path, &[200, 202, 204])?;
    info!("Session {} deleted by id", first.id);

    let fresh = open_session(anonymous.as_ref(), settings).await?;
    let authed = anonymous.with_auth(fresh.auth());
    let checked = async {
        let response = authed.get(&settings.system_path).await?;
        expect_status(&response, &settings.system_path, &[200])
    }
    .await;

    if let Err(e) = authed.delete_session(&fresh.id).await {
        warn!("Deleting session {} failed: {}", fresh.id, e);
    }

    checked.map(|_| CaseOutcome::Passed)
}

async fn open_session(api: &dyn RedfishApi, settings: &SuiteSettings) -> Result<Session> {
    let response = api
        .create_session(&settings.username, &settings.password)
        .await?;
    expect_status(&response, paths::SESSIONS, &[200, 201])?;
    Ok(Session::from_response(&response)?)
}
