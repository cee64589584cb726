//! Result and report types for security checks

use crate::error::CheckError;
use serde::{Deserialize, Serialize};

/// Outcome of a single security check.
///
/// Immutable once built; only a check's `test` creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCheckResult {
    check_id: String,
    check_name: String,
    passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl SecurityCheckResult {
    /// Create a result for the given check
    pub fn new(check_id: impl Into<String>, check_name: impl Into<String>, passed: bool) -> Self {
        Self {
            check_id: check_id.into(),
            check_name: check_name.into(),
            passed,
            message: None,
        }
    }

    /// Attach a diagnostic message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Identifier of the check that produced this result
    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    /// Name of the check that produced this result
    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    /// Whether the environment passed the check
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Diagnostic message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A check that produced an error instead of a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Check identifier
    pub check_id: String,

    /// Error message
    pub message: String,
}

impl From<&CheckError> for CheckFailure {
    fn from(err: &CheckError) -> Self {
        Self {
            check_id: err.check_id().to_string(),
            message: err.to_string(),
        }
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Checks that produced a result or an error
    pub total: usize,

    /// Checks that passed
    pub passed: usize,

    /// Checks that ran and did not pass
    pub failed: usize,

    /// Checks that errored
    pub errored: usize,
}

/// Complete outcome of one executor run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// When the last result was collected
    pub completed_at: chrono::DateTime<chrono::Utc>,

    /// Name of the environment the checks ran against
    pub environment: String,

    /// Results, sorted by check id
    pub results: Vec<SecurityCheckResult>,

    /// Checks that errored, sorted by check id
    pub errors: Vec<CheckFailure>,

    /// Summary statistics
    pub summary: ReportSummary,
}

impl SecurityReport {
    /// Start an empty report
    pub fn new(environment: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            started_at: now,
            completed_at: now,
            environment: environment.into(),
            results: Vec::new(),
            errors: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    /// Record a result
    pub fn add_result(&mut self, result: SecurityCheckResult) {
        self.summary.total += 1;
        if result.passed() {
            self.summary.passed += 1;
        } else {
            self.summary.failed += 1;
        }
        self.results.push(result);
    }

    /// Record a check error
    pub fn add_error(&mut self, err: &CheckError) {
        self.summary.total += 1;
        self.summary.errored += 1;
        self.errors.push(err.into());
    }

    /// Mark the report as completed and put entries in a stable order
    pub fn complete(&mut self) {
        self.results.sort_by(|a, b| a.check_id.cmp(&b.check_id));
        self.errors.sort_by(|a, b| a.check_id.cmp(&b.check_id));
        self.completed_at = chrono::Utc::now();
    }

    /// Whether every check ran and passed
    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0 && self.summary.errored == 0
    }

    /// Results that did not pass
    pub fn failed_results(&self) -> Vec<&SecurityCheckResult> {
        self.results.iter().filter(|r| !r.passed()).collect()
    }
}
