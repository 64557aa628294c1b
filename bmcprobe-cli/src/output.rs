//! Terminal rendering of suite reports and load results

use bmcprobe_core::{CaseOutcome, SuiteReport};
use bmcprobe_load::LoadResults;
use colored::Colorize;
use std::fmt::Write;

pub fn format_suite_report(report: &SuiteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", format!("=== {} suite ===", report.suite).bold());

    for result in &report.results {
        let label = match &result.outcome {
            CaseOutcome::Passed => "PASSED".green().bold(),
            CaseOutcome::Failed(_) => "FAILED".red().bold(),
            CaseOutcome::Skipped(_) => "SKIPPED".yellow().bold(),
        };
        let _ = write!(
            out,
            "{:<32} {} ({:.2}s)",
            result.name,
            label,
            result.elapsed.as_secs_f64()
        );
        if let Some(reason) = result.outcome.reason() {
            let _ = write!(out, " {}", reason.dimmed());
        }
        out.push('\n');
    }

    let summary = format!(
        "{}/{} passed, {} failed, {} skipped",
        report.passed(),
        report.total(),
        report.failed(),
        report.skipped()
    );
    let summary = if report.is_success() {
        summary.green().bold()
    } else {
        summary.red().bold()
    };
    let _ = writeln!(out, "\n{}", summary);
    out
}

pub fn format_load_results(results: &LoadResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=== Load Test Results ===".bold());
    let _ = writeln!(
        out,
        "{:<20} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Task", "Reqs", "Fails", "Avg", "Min", "Max", "P95", "P99", "RPS"
    );

    for (name, task) in &results.tasks {
        let times = &task.response_times;
        let _ = writeln!(
            out,
            "{:<20} {:>8} {:>8} {:>8.1} {:>8} {:>8} {:>8} {:>8} {:>8.2}",
            name,
            task.requests,
            task.failures,
            times.average_ms,
            times.min_ms,
            times.max_ms,
            times.p95_ms,
            times.p99_ms,
            task.requests_per_second
        );
    }

    let times = &results.response_times;
    let _ = writeln!(
        out,
        "{:<20} {:>8} {:>8} {:>8.1} {:>8} {:>8} {:>8} {:>8} {:>8.2}",
        "Aggregated".bold(),
        results.total_requests,
        results.failed_requests,
        times.average_ms,
        times.min_ms,
        times.max_ms,
        times.p95_ms,
        times.p99_ms,
        results.requests_per_second
    );

    if !results.failures.is_empty() {
        let _ = writeln!(out, "\n{}", "Failures:".red().bold());
        for failure in &results.failures {
            let _ = writeln!(out, "  {:>6}  {}: {}", failure.count, failure.task, failure.reason);
        }
    }

    let _ = writeln!(
        out,
        "\nDuration: {:.2}s, failure rate {:.2}%",
        results.duration_ms as f64 / 1000.0,
        results.failure_rate * 100.0
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmcprobe_core::CaseResult;
    use bmcprobe_load::LoadTracker;
    use std::time::Duration;

    #[test]
    fn test_suite_report_lines() {
        colored::control::set_override(false);

        let mut report = SuiteReport::new("redfish");
        for (name, outcome) in [
            ("service_root", CaseOutcome::Passed),
            ("power_on", CaseOutcome::failed("BMC did not reach On")),
            ("redfish_vs_ipmi", CaseOutcome::skipped("ipmitool unavailable")),
        ] {
            report.push(CaseResult {
                name: name.to_string(),
                outcome,
                started_at: chrono::Utc::now(),
                elapsed: Duration::from_millis(1500),
            });
        }

        let text = format_suite_report(&report);
        assert!(text.contains("=== redfish suite ==="));
        assert!(text.contains("service_root"));
        assert!(text.contains("FAILED (1.50s) BMC did not reach On"));
        assert!(text.contains("SKIPPED (1.50s) ipmitool unavailable"));
        assert!(text.contains("1/3 passed, 1 failed, 1 skipped"));
    }

    #[tokio::test]
    async fn test_load_table_lists_tasks_and_failures() {
        colored::control::set_override(false);

        let tracker = LoadTracker::new();
        tracker
            .record("Get Posts List", Duration::from_millis(40), Ok(()))
            .await;
        tracker
            .record(
                "Get Weather Data",
                Duration::from_millis(90),
                Err("Invalid weather data format".to_string()),
            )
            .await;
        let results = tracker.results(Duration::from_secs(2)).await;

        let text = format_load_results(&results);
        assert!(text.contains("Get Posts List"));
        assert!(text.contains("Get Weather Data"));
        assert!(text.contains("Aggregated"));
        assert!(text.contains("Get Weather Data: Invalid weather data format"));
        assert!(text.contains("failure rate 50.00%"));
    }
}
