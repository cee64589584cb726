//! Synchronous and asynchronous security check executors

use crate::builder::CheckSet;
use crate::handle::{CheckHandle, CheckOutcome};
use crate::metrics::{panic_message, publish_quietly};
use crate::pool::ExecutorService;
use mobsec_core::{CheckError, Environment, MetricsService, SecurityCheck, SecurityCheckResult};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use tracing::{debug, info, warn};

/// Results of a synchronous run, keyed by check id
pub type SecurityCheckResults = HashMap<String, SecurityCheckResult>;

/// Pending results of an asynchronous run, keyed by check id
pub type PendingSecurityCheckResults = HashMap<String, CheckHandle>;

/// Runs every registered check on the calling thread, in registration order.
///
/// A check that errors aborts the whole run: later checks are not executed
/// and no partial results are returned.
pub struct SyncSecurityCheckExecutor {
    environment: Arc<dyn Environment>,
    checks: CheckSet,
    metrics: Option<Arc<dyn MetricsService>>,
}

impl SyncSecurityCheckExecutor {
    pub(crate) fn new(
        environment: Arc<dyn Environment>,
        checks: CheckSet,
        metrics: Option<Arc<dyn MetricsService>>,
    ) -> Self {
        Self {
            environment,
            checks,
            metrics,
        }
    }

    /// Run all checks and collect their results
    pub fn execute(&self) -> Result<SecurityCheckResults, CheckError> {
        info!(
            "Running {} security checks against {}",
            self.checks.len(),
            self.environment.name()
        );

        let mut results = HashMap::with_capacity(self.checks.len());

        for check in self.checks.iter() {
            debug!("Running check: {}", check.id());

            let result = check.test(self.environment.as_ref()).map_err(|e| {
                warn!("Check {} failed: {}", check.id(), e);
                e
            })?;

            if let Some(metrics) = &self.metrics {
                publish_quietly(metrics.as_ref(), &result);
            }

            results.insert(check.id().to_string(), result);
        }

        let passed = results.values().filter(|r| r.passed()).count();
        info!(
            "Security checks completed: {} passed, {} failed",
            passed,
            results.len() - passed
        );

        Ok(results)
    }

    /// Name of the environment the checks run against
    pub fn environment_name(&self) -> &str {
        self.environment.name()
    }
}

/// Runs every registered check as its own job on a caller-owned worker pool.
///
/// `execute` returns immediately. A failing or panicking check only affects
/// its own handle.
pub struct AsyncSecurityCheckExecutor {
    environment: Arc<dyn Environment>,
    checks: CheckSet,
    metrics: Option<Arc<dyn MetricsService>>,
    executor_service: Arc<dyn ExecutorService>,
}

impl AsyncSecurityCheckExecutor {
    pub(crate) fn new(
        environment: Arc<dyn Environment>,
        checks: CheckSet,
        metrics: Option<Arc<dyn MetricsService>>,
        executor_service: Arc<dyn ExecutorService>,
    ) -> Self {
        Self {
            environment,
            checks,
            metrics,
            executor_service,
        }
    }

    /// Submit all checks and return a handle per check
    pub fn execute(&self) -> PendingSecurityCheckResults {
        info!(
            "Submitting {} security checks against {}",
            self.checks.len(),
            self.environment.name()
        );

        self.checks
            .iter()
            .map(|check| (check.id().to_string(), self.submit(Arc::clone(check))))
            .collect()
    }

    fn submit(&self, check: Arc<dyn SecurityCheck>) -> CheckHandle {
        let (sender, receiver) = mpsc::sync_channel(1);
        let handle = CheckHandle::new(check.id(), receiver);
        let environment = Arc::clone(&self.environment);
        let metrics = self.metrics.clone();

        self.executor_service.submit(Box::new(move || {
            let outcome = run_isolated(check.as_ref(), environment.as_ref());

            match (&outcome, &metrics) {
                (Ok(result), Some(metrics)) => publish_quietly(metrics.as_ref(), result),
                (Err(e), _) => warn!("Check {} failed: {}", check.id(), e),
                _ => {}
            }

            // The caller may have dropped the handle
            let _ = sender.send(outcome);
        }));

        handle
    }

    /// Name of the environment the checks run against
    pub fn environment_name(&self) -> &str {
        self.environment.name()
    }
}

/// Run a check, turning a panic into a [`CheckError::Panicked`]
fn run_isolated(check: &dyn SecurityCheck, environment: &dyn Environment) -> CheckOutcome {
    debug!("Running check: {}", check.id());
    catch_unwind(AssertUnwindSafe(|| check.test(environment))).unwrap_or_else(|payload| {
        Err(CheckError::Panicked {
            check: check.id().to_string(),
            message: panic_message(payload.as_ref()),
        })
    })
}
