//! Power-state transition verifier

use bmcprobe_config::PowerConfig;
use bmcprobe_core::PowerState;
use bmcprobe_http::{paths, RedfishApi};
use bmcprobe_resilience::{PollError, PollPolicy, Poller};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{expect_status, RedfishError, Result};

/// Statuses accepted for a reset action
const RESET_ACCEPTED: &[u16] = &[202, 204];

/// Poll budgets for each direction
#[derive(Debug, Clone, PartialEq)]
pub struct PowerPolicies {
    pub on: PollPolicy,
    pub off: PollPolicy,
}

impl PowerPolicies {
    pub fn for_state(&self, target: PowerState) -> &PollPolicy {
        match target {
            PowerState::On => &self.on,
            PowerState::Off => &self.off,
        }
    }
}

impl Default for PowerPolicies {
    fn default() -> Self {
        Self::from(&PowerConfig::default())
    }
}

impl From<&PowerConfig> for PowerPolicies {
    fn from(config: &PowerConfig) -> Self {
        let policy = |attempts| {
            PollPolicy::fixed(attempts, config.poll_interval)
                .with_settle_delay(config.settle_delay)
        };
        Self {
            on: policy(config.power_on_attempts),
            off: policy(config.power_off_attempts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Nothing was sent; the system already reported the target state
    AlreadyInState,
    Confirmed { accepted_status: u16, attempt: u32 },
}

/// Drives the reset action and waits for the reported state to follow
pub struct PowerVerifier<'a> {
    api: &'a dyn RedfishApi,
    system_path: &'a str,
    policies: &'a PowerPolicies,
}

impl<'a> PowerVerifier<'a> {
    pub fn new(api: &'a dyn RedfishApi, system_path: &'a str, policies: &'a PowerPolicies) -> Self {
        Self {
            api,
            system_path,
            policies,
        }
    }

    /// Current `PowerState`; the system resource must answer 200
    pub async fn current_state(&self) -> Result<Option<String>> {
        let response = self.api.get(self.system_path).await?;
        expect_status(&response, self.system_path, &[200])?;
        Ok(power_state_of(&response.json()?))
    }

    pub async fn transition(&self, target: PowerState) -> Result<TransitionOutcome> {
        let initial = self.current_state().await?;
        info!(
            "Initial power state: {}",
            initial.as_deref().unwrap_or("unknown")
        );

        if target.matches(initial.as_deref()) {
            return Ok(TransitionOutcome::AlreadyInState);
        }

        let reset_path = paths::reset_action(self.system_path);
        let reset_type = target.reset_type();
        let response = self.api.post(&reset_path, &reset_type.to_body()).await?;
        expect_status(&response, &reset_path, RESET_ACCEPTED)?;
        info!("{} accepted with status {}", reset_type, response.status);

        let policy = self.policies.for_state(target);
        let poller = Poller::new(policy.clone());
        let result = poller
            .poll_until(
                |attempt| async move { self.observe(attempt, target).await },
                |state| target.matches(state.as_deref()),
            )
            .await;

        match result {
            Ok(success) => {
                info!("System reached {} on attempt {}", target, success.attempt);
                Ok(TransitionOutcome::Confirmed {
                    accepted_status: response.status,
                    attempt: success.attempt,
                })
            }
            Err(PollError::Exhausted { attempts, last }) => Err(RedfishError::PowerTimeout {
                target,
                attempts,
                last: last.flatten().unwrap_or_else(|| "unknown".to_string()),
            }),
            Err(PollError::Probe { error, .. }) => Err(error),
        }
    }

    /// One poll; a non-200 answer counts as an unknown state, not an error
    async fn observe(&self, attempt: u32, target: PowerState) -> Result<Option<String>> {
        let response = self.api.get(self.system_path).await?;
        if response.status != 200 {
            warn!(
                "Attempt {}: system resource answered {}",
                attempt, response.status
            );
            return Ok(None);
        }

        let state = power_state_of(&response.json()?);
        if !target.matches(state.as_deref()) {
            info!(
                "Attempt {}: waiting for {}, current state {}",
                attempt,
                target,
                state.as_deref().unwrap_or("unknown")
            );
        }
        Ok(state)
    }
}

fn power_state_of(system: &Value) -> Option<String> {
    system
        .get("PowerState")
        .and_then(Value::as_str)
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRedfish;
    use bmcprobe_http::{ApiResponse, HttpMethod};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    const SYSTEM: &str = "/redfish/v1/Systems/system";
    const RESET: &str = "/redfish/v1/Systems/system/Actions/ComputerSystem.Reset";

    fn system(state: &str) -> ApiResponse {
        ApiResponse::json_body(200, &json!({"Id": "system", "PowerState": state}))
    }

    #[tokio::test(start_paused = true)]
    async fn test_power_on_confirmed_on_third_poll() {
        let api = FakeRedfish::new()
            .route_sequence(
                HttpMethod::Get,
                SYSTEM,
                vec![system("Off"), system("Off"), system("Off"), system("On")],
            )
            .route(HttpMethod::Post, RESET, ApiResponse::new(204, ""));
        let policies = PowerPolicies::default();
        let started = Instant::now();

        let outcome = PowerVerifier::new(&api, SYSTEM, &policies)
            .transition(PowerState::On)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::Confirmed {
                accepted_status: 204,
                attempt: 3
            }
        );
        assert_eq!(api.bodies_sent_to(RESET), vec![json!({"ResetType": "ForceOn"})]);
        // 10 s settle, then two 5 s intervals; none after the match
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_power_off_times_out() {
        let api = FakeRedfish::new()
            .route(HttpMethod::Get, SYSTEM, system("On"))
            .route(HttpMethod::Post, RESET, ApiResponse::new(202, ""));
        let policies = PowerPolicies::default();

        let err = PowerVerifier::new(&api, SYSTEM, &policies)
            .transition(PowerState::Off)
            .await
            .unwrap_err();

        match err {
            RedfishError::PowerTimeout {
                target,
                attempts,
                last,
            } => {
                assert_eq!(target, PowerState::Off);
                assert_eq!(attempts, 8);
                assert_eq!(last, "On");
            }
            other => panic!("unexpected error: {other}"),
        }
        // initial read plus eight polls
        assert_eq!(api.calls_to(SYSTEM), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_in_state_sends_nothing() {
        let api = FakeRedfish::new().route(HttpMethod::Get, SYSTEM, system("On"));
        let policies = PowerPolicies::default();

        let outcome = PowerVerifier::new(&api, SYSTEM, &policies)
            .transition(PowerState::On)
            .await
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::AlreadyInState);
        assert_eq!(api.calls_to(RESET), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_reset_fails() {
        let api = FakeRedfish::new()
            .route(HttpMethod::Get, SYSTEM, system("Off"))
            .route(HttpMethod::Post, RESET, ApiResponse::new(400, "bad ResetType"));
        let policies = PowerPolicies::default();

        let err = PowerVerifier::new(&api, SYSTEM, &policies)
            .transition(PowerState::On)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RedfishError::UnexpectedStatus { actual: 400, .. }
        ));
        assert_eq!(api.calls_to(SYSTEM), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_status_keeps_polling() {
        let api = FakeRedfish::new()
            .route_sequence(
                HttpMethod::Get,
                SYSTEM,
                vec![
                    system("Off"),
                    ApiResponse::new(503, "busy"),
                    system("On"),
                ],
            )
            .route(HttpMethod::Post, RESET, ApiResponse::new(202, ""));
        let policies = PowerPolicies::default();

        let outcome = PowerVerifier::new(&api, SYSTEM, &policies)
            .transition(PowerState::On)
            .await
            .unwrap();

        assert!(matches!(outcome, TransitionOutcome::Confirmed { attempt: 2, .. }));
    }

    #[test]
    fn test_policies_from_config() {
        let config = PowerConfig {
            power_on_attempts: 3,
            settle_delay: Duration::from_secs(1),
            ..Default::default()
        };
        let policies = PowerPolicies::from(&config);
        assert_eq!(policies.for_state(PowerState::On).max_attempts, 3);
        assert_eq!(policies.for_state(PowerState::Off).max_attempts, 8);
        assert_eq!(policies.on.settle_delay, Duration::from_secs(1));
        assert_eq!(policies.off.interval, Duration::from_secs(5));
    }
}
