//! Shared request accounting for a load run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Response-time distribution in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimes {
    pub average_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

impl ResponseTimes {
    /// Sorts `samples` in place
    fn from_samples(samples: &mut [u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort_unstable();

        let len = samples.len();
        Self {
            average_ms: samples.iter().sum::<u64>() as f64 / len as f64,
            min_ms: samples[0],
            max_ms: samples[len - 1],
            p50_ms: samples[len * 50 / 100],
            p95_ms: samples[len * 95 / 100],
            p99_ms: samples[len * 99 / 100],
        }
    }
}

/// Per-task breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResults {
    pub requests: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub requests_per_second: f64,
    pub response_times: ResponseTimes,
}

/// How often a task failed for one reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCount {
    pub task: String,
    pub reason: String,
    pub count: u64,
}

/// Final results of a load run, also the JSON report format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResults {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub failure_rate: f64,
    pub requests_per_second: f64,
    pub response_times: ResponseTimes,
    pub tasks: BTreeMap<String, TaskResults>,
    /// Most frequent first
    pub failures: Vec<FailureCount>,
}

#[derive(Debug, Default)]
struct TaskStats {
    response_times: Vec<u64>,
    failures: u64,
}

/// Collects samples from every simulated user
pub struct LoadTracker {
    started_at: DateTime<Utc>,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    response_times: Mutex<Vec<u64>>,
    task_stats: Mutex<HashMap<String, TaskStats>>,
    failure_reasons: Mutex<HashMap<(String, String), u64>>,
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadTracker {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            response_times: Mutex::new(Vec::new()),
            task_stats: Mutex::new(HashMap::new()),
            failure_reasons: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request; `outcome` carries the failure reason
    pub async fn record(&self, task: &str, elapsed: Duration, outcome: Result<(), String>) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match &outcome {
            Ok(()) => self.successful_requests.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed_requests.fetch_add(1, Ordering::Relaxed),
        };

        self.response_times.lock().await.push(elapsed_ms);

        {
            let mut task_stats = self.task_stats.lock().await;
            let stats = task_stats.entry(task.to_string()).or_default();
            stats.response_times.push(elapsed_ms);
            if outcome.is_err() {
                stats.failures += 1;
            }
        }

        if let Err(reason) = outcome {
            *self
                .failure_reasons
                .lock()
                .await
                .entry((task.to_string(), reason))
                .or_insert(0) += 1;
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed) + self.failed_requests.load(Ordering::Relaxed)
    }

    /// Aggregate everything recorded so far over a run of `duration`
    pub async fn results(&self, duration: Duration) -> LoadResults {
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total = successful + failed;
        let seconds = duration.as_secs_f64();

        let per_second = |count: u64| if seconds > 0.0 { count as f64 / seconds } else { 0.0 };
        let rate = |part: u64, whole: u64| if whole > 0 { part as f64 / whole as f64 } else { 0.0 };

        let response_times = {
            let mut samples = self.response_times.lock().await.clone();
            ResponseTimes::from_samples(&mut samples)
        };

        let tasks = self
            .task_stats
            .lock()
            .await
            .iter()
            .map(|(name, stats)| {
                let requests = stats.response_times.len() as u64;
                let mut samples = stats.response_times.clone();
                let results = TaskResults {
                    requests,
                    failures: stats.failures,
                    failure_rate: rate(stats.failures, requests),
                    requests_per_second: per_second(requests),
                    response_times: ResponseTimes::from_samples(&mut samples),
                };
                (name.clone(), results)
            })
            .collect();

        let mut failures: Vec<FailureCount> = self
            .failure_reasons
            .lock()
            .await
            .iter()
            .map(|((task, reason), count)| FailureCount {
                task: task.clone(),
                reason: reason.clone(),
                count: *count,
            })
            .collect();
        failures.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.task.cmp(&b.task))
                .then_with(|| a.reason.cmp(&b.reason))
        });

        LoadResults {
            started_at: self.started_at,
            duration_ms: duration.as_millis() as u64,
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            failure_rate: rate(failed, total),
            requests_per_second: per_second(total),
            response_times,
            tasks,
            failures,
        }
    }
}
