//! Case outcomes and suite reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How a single case ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    /// Soft pass: the precondition for the case was not met
    Skipped(String),
}

impl CaseOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        CaseOutcome::Failed(reason.into())
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        CaseOutcome::Skipped(reason.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseOutcome::Passed => "PASSED",
            CaseOutcome::Failed(_) => "FAILED",
            CaseOutcome::Skipped(_) => "SKIPPED",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CaseOutcome::Passed => None,
            CaseOutcome::Failed(reason) | CaseOutcome::Skipped(reason) => Some(reason),
        }
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {}", self.label(), reason),
            None => write!(f, "{}", self.label()),
        }
    }
}

/// Outcome of one case with timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub outcome: CaseOutcome,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

/// Ordered collection of case results for one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(CaseOutcome::is_failure)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Skipped(_)))
    }

    /// A suite succeeds when no case failed; skips do not count against it
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome_of(&self, name: &str) -> Option<&CaseOutcome> {
        self.results
            .iter()
            .find(|result| result.name == name)
            .map(|result| &result.outcome)
    }

    fn count(&self, predicate: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|result| predicate(&result.outcome))
            .count()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
