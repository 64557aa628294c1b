//! Load profiles: a host, weighted tasks and think time

use bmcprobe_config::ProbeConfig;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::time::Duration;

use crate::error::{LoadError, Result};
use crate::task::{TaskSpec, TaskTarget, Validator};

pub const BMC_PROFILE: &str = "bmc";
pub const PUBLIC_API_PROFILE: &str = "public_api";

/// A simulated user behavior
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    host: String,
    credentials: Option<(String, String)>,
    min_wait: Duration,
    max_wait: Duration,
    tasks: Vec<TaskSpec>,
    weights: WeightedIndex<u32>,
}

impl Profile {
    /// Fails when no task carries weight or the wait range is inverted
    pub fn new(
        name: &str,
        host: &str,
        tasks: Vec<TaskSpec>,
        min_wait: Duration,
        max_wait: Duration,
    ) -> Result<Self> {
        let invalid = |reason: String| LoadError::InvalidProfile {
            profile: name.to_string(),
            reason,
        };

        if min_wait > max_wait {
            return Err(invalid(format!(
                "min_wait {:?} is greater than max_wait {:?}",
                min_wait, max_wait
            )));
        }

        let weights = WeightedIndex::new(tasks.iter().map(|task| task.weight))
            .map_err(|e| invalid(format!("task weights: {}", e)))?;

        Ok(Self {
            name: name.to_string(),
            host: host.trim_end_matches('/').to_string(),
            credentials: None,
            min_wait,
            max_wait,
            tasks,
            weights,
        })
    }

    /// Send HTTP basic credentials with every request
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(user, password)| (user.as_str(), password.as_str()))
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Weighted pick; zero-weight tasks are never returned
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &TaskSpec {
        &self.tasks[self.weights.sample(rng)]
    }

    /// Uniform think time within `[min_wait, max_wait]`
    pub fn think_time<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_wait == self.max_wait {
            return self.min_wait;
        }
        rng.gen_range(self.min_wait..=self.max_wait)
    }
}

/// Redfish system resource polled by the BMC user
pub fn bmc_profile(config: &ProbeConfig) -> Result<Profile> {
    let bmc = &config.load.bmc;
    let system = TaskTarget::Path(config.redfish.system_path.clone());
    let tasks = vec![
        TaskSpec::new(
            "Get System Info",
            bmc.system_info_weight,
            system.clone(),
            Validator::SystemInfo,
        ),
        TaskSpec::new(
            "Get Power State",
            bmc.power_state_weight,
            system,
            Validator::PowerState,
        ),
    ];

    Ok(Profile::new(
        BMC_PROFILE,
        config.target.base_url(),
        tasks,
        bmc.min_wait,
        bmc.max_wait,
    )?
    .with_basic_auth(&config.target.username, &config.target.password))
}

/// Unrelated public endpoints used as a baseline
pub fn public_api_profile(config: &ProbeConfig) -> Result<Profile> {
    let public = &config.load.public_api;
    let tasks = vec![
        TaskSpec::new(
            "Get Posts List",
            public.posts_weight,
            TaskTarget::Path("/posts".to_string()),
            Validator::PostsList,
        ),
        TaskSpec::new(
            "Get Weather Data",
            public.weather_weight,
            TaskTarget::Url(public.weather_url.clone()),
            Validator::WeatherData,
        ),
    ];

    Profile::new(
        PUBLIC_API_PROFILE,
        &public.host,
        tasks,
        public.min_wait,
        public.max_wait,
    )
}

/// Every enabled profile, BMC first
pub fn profiles_from_config(config: &ProbeConfig) -> Result<Vec<Profile>> {
    let mut profiles = Vec::new();
    if config.load.bmc.enabled {
        profiles.push(bmc_profile(config)?);
    }
    if config.load.public_api.enabled {
        profiles.push(public_api_profile(config)?);
    }

    if profiles.is_empty() {
        return Err(LoadError::NoProfiles);
    }
    Ok(profiles)
}
