//! Output formatting for security reports

use mobsec_core::{Result, SecurityReport};

/// Format a report as text
pub fn format_text(report: &SecurityReport) -> String {
    let mut output = String::new();

    // Header
    output.push_str(&format!("mobsec Security Check Report\n{}\n\n", "=".repeat(28)));

    output.push_str(&format!("Environment: {}\n", report.environment));
    output.push_str(&format!(
        "Duration: {}ms\n\n",
        (report.completed_at - report.started_at).num_milliseconds()
    ));

    // Summary
    output.push_str("Summary\n-------\n");
    output.push_str(&format!("Total Checks: {}\n", report.summary.total));
    output.push_str(&format!("Passed: {}\n", report.summary.passed));
    output.push_str(&format!("Failed: {}\n", report.summary.failed));
    output.push_str(&format!("Errored: {}\n\n", report.summary.errored));

    if !report.results.is_empty() {
        output.push_str("Results\n-------\n");
        for result in &report.results {
            let status = if result.passed() { "PASS" } else { "FAIL" };
            output.push_str(&format!("[{}] {} ({})\n", status, result.check_name(), result.check_id()));
            if let Some(message) = result.message() {
                output.push_str(&format!("       {}\n", message));
            }
        }
        output.push('\n');
    }

    if !report.errors.is_empty() {
        output.push_str("Errors\n------\n");
        for error in &report.errors {
            output.push_str(&format!("[{}] {}\n", error.check_id, error.message));
        }
    }

    output
}

/// Format a report as JSON
pub fn format_json(report: &SecurityReport, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(report).map_err(Into::into)
    } else {
        serde_json::to_string(report).map_err(Into::into)
    }
}
