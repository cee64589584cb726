//! Error types for mobsec

use std::time::Duration;
use thiserror::Error;

/// Configuration errors raised by executor builders.
///
/// These are only ever produced by `build()`, never by `execute()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No environment was supplied to the builder
    #[error("an environment is required to build a security check executor")]
    MissingEnvironment,

    /// The builder has no registered checks
    #[error("at least one security check must be registered")]
    NoSecurityChecks,

    /// Asynchronous executor built without a worker pool
    #[error("an executor service is required to build an asynchronous executor")]
    MissingExecutorService,
}

/// Errors raised while evaluating a single security check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The environment cannot answer what the check needs to know
    #[error("check {check} cannot run against this environment: {reason}")]
    InvalidEnvironment { check: String, reason: String },

    /// The probe itself failed
    #[error("check {check} failed: {message}")]
    Probe { check: String, message: String },

    /// The check panicked on a worker thread
    #[error("check {check} panicked: {message}")]
    Panicked { check: String, message: String },

    /// The worker pool dropped the job before it produced a result
    #[error("check {check} was abandoned before producing a result")]
    Abandoned { check: String },

    /// Waiting on a result handle ran out of time
    #[error("check {check} did not finish within {timeout:?}")]
    Timeout { check: String, timeout: Duration },
}

impl CheckError {
    /// Shorthand for [`CheckError::InvalidEnvironment`]
    pub fn invalid_environment(check: impl Into<String>, reason: impl Into<String>) -> Self {
        CheckError::InvalidEnvironment {
            check: check.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`CheckError::Probe`]
    pub fn probe(check: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::Probe {
            check: check.into(),
            message: message.into(),
        }
    }

    /// Identifier of the check this error belongs to
    pub fn check_id(&self) -> &str {
        match self {
            CheckError::InvalidEnvironment { check, .. }
            | CheckError::Probe { check, .. }
            | CheckError::Panicked { check, .. }
            | CheckError::Abandoned { check }
            | CheckError::Timeout { check, .. } => check,
        }
    }
}

/// Errors raised by metrics sinks.
///
/// The executors log and discard these; they never reach a caller of `execute()`.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Writing the metric failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the metric failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The sink cannot accept metrics right now
    #[error("Metrics sink unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::Serialization(err.to_string())
    }
}

/// Main error type for mobsec operations
#[derive(Error, Debug)]
pub enum MobsecError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with context
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Executor could not be built
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A check failed to evaluate
    #[error(transparent)]
    Check(#[from] CheckError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MobsecError {
    fn from(err: serde_json::Error) -> Self {
        MobsecError::Serialization(err.to_string())
    }
}

/// Result type alias for mobsec operations
pub type Result<T> = std::result::Result<T, MobsecError>;
