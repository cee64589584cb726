//! Builders for the synchronous and asynchronous executors

use crate::executor::{AsyncSecurityCheckExecutor, SyncSecurityCheckExecutor};
use crate::pool::ExecutorService;
use mobsec_core::{BuildError, Environment, MetricsService, SecurityCheck};
use std::sync::Arc;
use tracing::debug;

/// Entry points for building security check executors
pub struct SecurityCheckExecutor;

impl SecurityCheckExecutor {
    /// Start building an executor that runs checks on the calling thread
    pub fn new_sync_executor(environment: Arc<dyn Environment>) -> SyncExecutorBuilder {
        SyncExecutorBuilder::new().with_environment(environment)
    }

    /// Start building an executor that runs checks on a worker pool
    pub fn new_async_executor(environment: Arc<dyn Environment>) -> AsyncExecutorBuilder {
        AsyncExecutorBuilder::new().with_environment(environment)
    }
}

/// Registered checks in registration order, unique by id
#[derive(Clone, Default)]
pub(crate) struct CheckSet {
    checks: Vec<Arc<dyn SecurityCheck>>,
}

impl CheckSet {
    /// Register a check; a check with the same id is replaced in place
    fn insert(&mut self, check: Arc<dyn SecurityCheck>) {
        match self.checks.iter_mut().find(|c| c.id() == check.id()) {
            Some(existing) => {
                debug!("Replacing previously registered check {}", check.id());
                *existing = check;
            }
            None => self.checks.push(check),
        }
    }

    fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.checks.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<dyn SecurityCheck>> {
        self.checks.iter()
    }
}

/// Settings shared by both builders
#[derive(Clone, Default)]
struct CommonConfig {
    environment: Option<Arc<dyn Environment>>,
    checks: CheckSet,
    metrics: Option<Arc<dyn MetricsService>>,
}

impl CommonConfig {
    fn validate(self) -> Result<(Arc<dyn Environment>, CheckSet, Option<Arc<dyn MetricsService>>), BuildError> {
        let environment = self.environment.ok_or(BuildError::MissingEnvironment)?;
        if self.checks.is_empty() {
            return Err(BuildError::NoSecurityChecks);
        }
        Ok((environment, self.checks, self.metrics))
    }
}

/// Builder for [`SyncSecurityCheckExecutor`]
#[derive(Clone, Default)]
pub struct SyncExecutorBuilder {
    common: CommonConfig,
}

impl SyncExecutorBuilder {
    /// Create a builder with no environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment the checks run against
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.common.environment = Some(environment);
        self
    }

    /// Register a check. The last check registered under an id wins.
    pub fn with_security_check<C: SecurityCheck + 'static>(self, check: C) -> Self {
        self.with_shared_security_check(Arc::new(check))
    }

    /// Register a shared check. The last check registered under an id wins.
    pub fn with_shared_security_check(mut self, check: Arc<dyn SecurityCheck>) -> Self {
        self.common.checks.insert(check);
        self
    }

    /// Publish every result to `metrics`
    pub fn with_metrics_service(mut self, metrics: Arc<dyn MetricsService>) -> Self {
        self.common.metrics = Some(metrics);
        self
    }

    /// Validate the configuration and build the executor
    pub fn build(self) -> Result<SyncSecurityCheckExecutor, BuildError> {
        let (environment, checks, metrics) = self.common.validate()?;
        Ok(SyncSecurityCheckExecutor::new(environment, checks, metrics))
    }
}

/// Builder for [`AsyncSecurityCheckExecutor`]
#[derive(Clone, Default)]
pub struct AsyncExecutorBuilder {
    common: CommonConfig,
    executor_service: Option<Arc<dyn ExecutorService>>,
}

impl AsyncExecutorBuilder {
    /// Create a builder with no environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment the checks run against
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.common.environment = Some(environment);
        self
    }

    /// Register a check. The last check registered under an id wins.
    pub fn with_security_check<C: SecurityCheck + 'static>(self, check: C) -> Self {
        self.with_shared_security_check(Arc::new(check))
    }

    /// Register a shared check. The last check registered under an id wins.
    pub fn with_shared_security_check(mut self, check: Arc<dyn SecurityCheck>) -> Self {
        self.common.checks.insert(check);
        self
    }

    /// Publish every result to `metrics` from the worker that produced it
    pub fn with_metrics_service(mut self, metrics: Arc<dyn MetricsService>) -> Self {
        self.common.metrics = Some(metrics);
        self
    }

    /// Run checks on `executor_service`. The caller keeps ownership of the pool.
    pub fn with_executor_service(mut self, executor_service: Arc<dyn ExecutorService>) -> Self {
        self.executor_service = Some(executor_service);
        self
    }

    /// Validate the configuration and build the executor
    pub fn build(self) -> Result<AsyncSecurityCheckExecutor, BuildError> {
        let (environment, checks, metrics) = self.common.validate()?;
        let executor_service = self
            .executor_service
            .ok_or(BuildError::MissingExecutorService)?;
        Ok(AsyncSecurityCheckExecutor::new(
            environment,
            checks,
            metrics,
            executor_service,
        ))
    }
}
