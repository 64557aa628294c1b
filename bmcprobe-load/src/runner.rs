//! Concurrent load runner

use bmcprobe_config::domains::load::LoadConfig;
use bmcprobe_config::ProbeConfig;
use bmcprobe_http::{build_client, HttpConfig};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::error::{LoadError, Result};
use crate::profile::{profiles_from_config, Profile};
use crate::task::TaskSpec;
use crate::tracker::{LoadResults, LoadTracker};

/// Shape of a run
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    pub users: usize,
    /// Users started per second
    pub spawn_rate: f64,
    pub run_time: Duration,
}

impl From<&LoadConfig> for LoadPlan {
    fn from(config: &LoadConfig) -> Self {
        Self {
            users: config.users,
            spawn_rate: config.spawn_rate,
            run_time: config.run_time,
        }
    }
}

impl LoadPlan {
    /// `(profile index, start offset)` per user that starts before the run ends
    ///
    /// Users go round-robin over the profiles and start `1 / spawn_rate`
    /// seconds apart.
    pub fn schedule(&self, profiles: usize) -> Result<Vec<(usize, Duration)>> {
        if profiles == 0 {
            return Ok(Vec::new());
        }
        if self.spawn_rate.is_nan() || self.spawn_rate <= 0.0 {
            return Err(LoadError::InvalidPlan(format!(
                "spawn rate must be positive, got {}",
                self.spawn_rate
            )));
        }

        let mut schedule = Vec::with_capacity(self.users);
        for user in 0..self.users {
            let offset = Duration::try_from_secs_f64(user as f64 / self.spawn_rate).map_err(|e| {
                LoadError::InvalidPlan(format!(
                    "start of user {} at spawn rate {}: {}",
                    user, self.spawn_rate, e
                ))
            })?;
            if offset >= self.run_time {
                break;
            }
            schedule.push((user % profiles, offset));
        }
        Ok(schedule)
    }
}

struct ProfileRuntime {
    profile: Profile,
    client: Client,
}

/// Drives simulated users against every profile until the run time elapses
pub struct LoadRunner {
    profiles: Vec<Arc<ProfileRuntime>>,
    plan: LoadPlan,
}

impl LoadRunner {
    /// Builds one HTTP client per profile
    pub fn new(profiles: Vec<Profile>, plan: LoadPlan, http: &HttpConfig) -> Result<Self> {
        let profiles = profiles
            .into_iter()
            .map(|profile| {
                Ok(Arc::new(ProfileRuntime {
                    profile,
                    client: build_client(http)?,
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { profiles, plan })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(
            profiles_from_config(config)?,
            LoadPlan::from(&config.load),
            &config.http,
        )
    }

    pub fn plan(&self) -> &LoadPlan {
        &self.plan
    }

    pub async fn run(&self) -> Result<LoadResults> {
        let schedule = self.plan.schedule(self.profiles.len())?;
        let tracker = Arc::new(LoadTracker::new());
        let started = Instant::now();
        let deadline = started.checked_add(self.plan.run_time).ok_or_else(|| {
            LoadError::InvalidPlan(format!("run time {:?} is out of range", self.plan.run_time))
        })?;

        info!(
            "Starting load run: {} users over {} profiles for {:?}",
            schedule.len(),
            self.profiles.len(),
            self.plan.run_time
        );
        if schedule.len() < self.plan.users {
            warn!(
                "Only {} of {} users start before the run ends at spawn rate {}",
                schedule.len(),
                self.plan.users,
                self.plan.spawn_rate
            );
        }

        let handles: Vec<_> = schedule
            .into_iter()
            .enumerate()
            .map(|(user, (profile_index, offset))| {
                let runtime = Arc::clone(&self.profiles[profile_index]);
                let tracker = Arc::clone(&tracker);
                tokio::spawn(simulate_user(user, runtime, tracker, started + offset, deadline))
            })
            .collect();

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("Simulated user aborted: {}", e);
            }
        }

        let results = tracker.results(started.elapsed()).await;
        info!(
            "Load run finished: {} requests, {} failed",
            results.total_requests, results.failed_requests
        );
        Ok(results)
    }
}

async fn simulate_user(
    user: usize,
    runtime: Arc<ProfileRuntime>,
    tracker: Arc<LoadTracker>,
    start_at: Instant,
    deadline: Instant,
) {
    sleep_until(start_at).await;
    debug!("User {} started on profile {}", user, runtime.profile.name());

    let mut rng = StdRng::from_entropy();
    while Instant::now() < deadline {
        let task = runtime.profile.pick(&mut rng);
        let request_started = Instant::now();

        // requests still in flight at the deadline are dropped unrecorded
        let outcome = match timeout_at(deadline, execute(&runtime, task)).await {
            Ok(outcome) => outcome,
            Err(_) => break,
        };
        if let Err(reason) = &outcome {
            debug!("{} failed: {}", task.name, reason);
        }
        tracker.record(&task.name, request_started.elapsed(), outcome).await;

        let think = runtime.profile.think_time(&mut rng);
        let wake_at = Instant::now()
            .checked_add(think)
            .map_or(deadline, |at| at.min(deadline));
        sleep_until(wake_at).await;
    }

    debug!("User {} stopped", user);
}

async fn execute(runtime: &ProfileRuntime, task: &TaskSpec) -> std::result::Result<(), String> {
    let url = task.target.resolve(runtime.profile.host());
    let mut request = runtime.client.get(&url);
    if let Some((username, password)) = runtime.profile.credentials() {
        request = request.basic_auth(username, Some(password));
    }

    let response = request
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    task.validator.check(status, &body)
}
