//! Redfish/IPMI temperature cross-checking
//!
//! Sensor labels differ between the two sources ("CPU Temp" vs "CPU1 Temp"),
//! so each Redfish sensor is paired with the IPMI sensor whose label shares
//! the largest fraction of whitespace-delimited tokens. Sensors that find no
//! partner above the similarity threshold are left out of the statistics
//! entirely and reported separately as unmatched.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One temperature reading from either source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub name: String,
    pub celsius: f64,
}

impl SensorReading {
    pub fn new(name: impl Into<String>, celsius: f64) -> Self {
        Self {
            name: name.into(),
            celsius,
        }
    }
}

/// Thresholds used when pairing and judging sensors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// A pair is only accepted when its similarity is strictly above this
    pub similarity_threshold: f64,
    /// Largest absolute difference (inclusive) for a pair to agree
    pub tolerance_celsius: f64,
    /// Fraction of compared pairs that must agree for the check to pass
    pub min_match_ratio: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            tolerance_celsius: 5.0,
            min_match_ratio: 0.7,
        }
    }
}

/// Token-overlap similarity of two labels
///
/// Shared lowercase whitespace tokens divided by the size of the larger token
/// set; zero when either label has no tokens.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    shared as f64 / left.len().max(right.len()) as f64
}

/// Best IPMI partner for `name`, first one wins on ties
pub fn best_match<'a>(
    name: &str,
    candidates: &'a [SensorReading],
    threshold: f64,
) -> Option<(&'a SensorReading, f64)> {
    let mut best: Option<(&SensorReading, f64)> = None;
    for candidate in candidates {
        let score = similarity(name, &candidate.name);
        let best_score = best.map(|(_, s)| s).unwrap_or(0.0);
        if score > best_score && score > threshold {
            best = Some((candidate, score));
        }
    }
    best
}

/// A Redfish sensor paired with its IPMI counterpart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPair {
    pub redfish_name: String,
    pub ipmi_name: String,
    pub redfish_celsius: f64,
    pub ipmi_celsius: f64,
    pub similarity: f64,
    pub difference: f64,
    pub within_tolerance: bool,
}

/// Outcome of comparing the two sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossCheckReport {
    pub pairs: Vec<SensorPair>,
    /// Redfish sensors with no IPMI label above the threshold
    pub unmatched: Vec<String>,
}

impl CrossCheckReport {
    pub fn compared(&self) -> usize {
        self.pairs.len()
    }

    pub fn matching(&self) -> usize {
        self.pairs.iter().filter(|pair| pair.within_tolerance).count()
    }

    /// Fraction of compared pairs within tolerance, `None` when nothing was compared
    pub fn match_ratio(&self) -> Option<f64> {
        if self.pairs.is_empty() {
            None
        } else {
            Some(self.matching() as f64 / self.compared() as f64)
        }
    }

    pub fn passes(&self, policy: &MatchPolicy) -> bool {
        self.match_ratio()
            .map(|ratio| ratio >= policy.min_match_ratio)
            .unwrap_or(false)
    }
}

pub fn cross_check(
    redfish: &[SensorReading],
    ipmi: &[SensorReading],
    policy: &MatchPolicy,
) -> CrossCheckReport {
    let mut report = CrossCheckReport::default();

    for sensor in redfish {
        match best_match(&sensor.name, ipmi, policy.similarity_threshold) {
            Some((partner, score)) => {
                let difference = (sensor.celsius - partner.celsius).abs();
                report.pairs.push(SensorPair {
                    redfish_name: sensor.name.clone(),
                    ipmi_name: partner.name.clone(),
                    redfish_celsius: sensor.celsius,
                    ipmi_celsius: partner.celsius,
                    similarity: score,
                    difference,
                    within_tolerance: difference <= policy.tolerance_celsius,
                });
            }
            None => {
                tracing::debug!("No IPMI sensor similar enough to '{}'", sensor.name);
                report.unmatched.push(sensor.name.clone());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(values: &[(&str, f64)]) -> Vec<SensorReading> {
        values
            .iter()
            .map(|(name, celsius)| SensorReading::new(*name, *celsius))
            .collect()
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("CPU Temp", "cpu temp"), 1.0);
        assert_eq!(similarity("CPU1 Temp", "CPU Temp"), 0.5);
        assert_eq!(similarity("cpu0", "cpu temp"), 0.0);
        assert_eq!(similarity("", "cpu temp"), 0.0);
        assert!((similarity("DIMM A Temp", "DIMM Temp") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_concatenated_name_is_excluded() {
        let redfish = readings(&[("CPU0", 45.0)]);
        let ipmi = readings(&[("CPU Temp", 44.0)]);
        let report = cross_check(&redfish, &ipmi, &MatchPolicy::default());
        assert_eq!(report.compared(), 0);
        assert_eq!(report.unmatched, vec!["CPU0"]);
        assert_eq!(report.match_ratio(), None);
        assert!(!report.passes(&MatchPolicy::default()));
    }

    #[test]
    fn test_best_match_prefers_highest_similarity() {
        let ipmi = readings(&[("CPU Fan", 0.0), ("CPU Core Temp", 50.0), ("CPU Temp", 47.0)]);
        let (partner, score) = best_match("CPU Temp", &ipmi, 0.3).unwrap();
        assert_eq!(partner.name, "CPU Temp");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_best_match_first_wins_on_tie() {
        let ipmi = readings(&[("CPU1 Temp", 40.0), ("CPU2 Temp", 60.0)]);
        let (partner, _) = best_match("CPU Temp", &ipmi, 0.3).unwrap();
        assert_eq!(partner.name, "CPU1 Temp");
    }

    #[test]
    fn test_threshold_is_strict() {
        // 1 shared token of 3 is ~0.33, above 0.3; raising the bar excludes it
        let ipmi = readings(&[("Ambient Board Temp", 30.0)]);
        assert!(best_match("Inlet Air Temp", &ipmi, 0.3).is_some());
        assert!(best_match("Inlet Air Temp", &ipmi, 0.34).is_none());
    }

    #[test]
    fn test_tolerance_and_ratio() {
        let redfish = readings(&[
            ("CPU Temp", 45.0),
            ("DIMM Temp", 40.0),
            ("PCH Temp", 50.0),
            ("Inlet Temp", 22.0),
        ]);
        let ipmi = readings(&[
            ("CPU Temp", 50.0),
            ("DIMM Temp", 41.0),
            ("PCH Temp", 58.0),
            ("Inlet Temp", 22.5),
        ]);
        let policy = MatchPolicy::default();
        let report = cross_check(&redfish, &ipmi, &policy);
        assert_eq!(report.compared(), 4);
        // 5.0 exactly is within tolerance; 8.0 is not
        assert_eq!(report.matching(), 3);
        assert_eq!(report.match_ratio(), Some(0.75));
        assert!(report.passes(&policy));

        let strict = MatchPolicy {
            min_match_ratio: 0.8,
            ..policy
        };
        assert!(!report.passes(&strict));
    }

    #[test]
    fn test_unmatched_sensors_shrink_population() {
        let redfish = readings(&[("CPU Temp", 45.0), ("Fan0", 30.0), ("PSU0", 90.0)]);
        let ipmi = readings(&[("CPU Temp", 46.0)]);
        let report = cross_check(&redfish, &ipmi, &MatchPolicy::default());
        assert_eq!(report.compared(), 1);
        assert_eq!(report.unmatched.len(), 2);
        assert_eq!(report.match_ratio(), Some(1.0));
    }
}
