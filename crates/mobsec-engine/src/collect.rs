//! Turning executor output into a [`SecurityReport`]

use crate::executor::{PendingSecurityCheckResults, SecurityCheckResults};
use mobsec_core::{CheckError, SecurityReport};
use std::time::Duration;

/// Build a report from a synchronous run
pub fn report_from_results(environment: &str, results: SecurityCheckResults) -> SecurityReport {
    let mut report = SecurityReport::new(environment);
    for result in results.into_values() {
        report.add_result(result);
    }
    report.complete();
    report
}

/// Build a report from a synchronous run that aborted on a check error.
///
/// A sync `execute()` returns only the error, so results of checks that ran
/// before the abort are not available here and the report holds the single
/// error. Use an asynchronous run to keep every check's outcome.
pub fn report_from_error(environment: &str, err: &CheckError) -> SecurityReport {
    let mut report = SecurityReport::new(environment);
    report.add_error(err);
    report.complete();
    report
}

/// Resolve every handle of an asynchronous run and build a report.
///
/// With a timeout, each handle is waited on for at most that long; handles
/// that time out are reported as errors.
pub fn report_from_handles(
    environment: &str,
    handles: PendingSecurityCheckResults,
    timeout: Option<Duration>,
) -> SecurityReport {
    let mut report = SecurityReport::new(environment);

    for handle in handles.into_values() {
        let outcome = match timeout {
            Some(timeout) => handle.get_timeout(timeout),
            None => handle.get(),
        };
        match outcome {
            Ok(result) => report.add_result(result),
            Err(e) => report.add_error(&e),
        }
    }

    report.complete();
    report
}
