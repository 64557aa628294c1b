//! Thermal resource lookup with a single fallback path

use bmcprobe_http::RedfishApi;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Outcome of looking up the thermal resource
#[derive(Debug, Clone, PartialEq)]
pub enum ThermalFetch {
    Available { path: String, body: Value },
    /// The final path answered with something other than 200
    Unavailable { path: String, status: u16 },
}

/// GET `primary`; on 404 only, GET `fallback` once
pub async fn fetch_thermal(
    api: &dyn RedfishApi,
    primary: &str,
    fallback: &str,
) -> Result<ThermalFetch> {
    let mut path = primary;
    let mut response = api.get(path).await?;

    if response.status == 404 {
        debug!("{} not found, trying {}", primary, fallback);
        path = fallback;
        response = api.get(path).await?;
    }

    if response.status != 200 {
        warn!("Thermal data unavailable: {} from {}", response.status, path);
        return Ok(ThermalFetch::Unavailable {
            path: path.to_string(),
            status: response.status,
        });
    }

    Ok(ThermalFetch::Available {
        path: path.to_string(),
        body: response.json()?,
    })
}
