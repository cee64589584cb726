//! Core traits that define the security check abstraction layer.
//!
//! Checks, environments and metrics sinks meet only through these traits,
//! so the executors never depend on the concrete shape of any of them.

use crate::error::{CheckError, MetricsError};
use crate::report::SecurityCheckResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage encryption state reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionStatus {
    /// Encryption is not supported by the device
    Unsupported,
    /// Encryption is supported but not active
    Inactive,
    /// Encryption is being enabled
    Activating,
    /// Encryption is active
    Active,
    /// Active, but keyed by a default key rather than the user's credential
    ActiveDefaultKey,
    /// Active and bound to the current user
    ActivePerUser,
}

impl EncryptionStatus {
    /// Whether data at rest can only be read with the user's credential.
    ///
    /// `ActiveDefaultKey` does not count: the default key unlocks storage
    /// without the user.
    pub fn is_user_protected(&self) -> bool {
        matches!(self, EncryptionStatus::Active | EncryptionStatus::ActivePerUser)
    }
}

impl std::fmt::Display for EncryptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncryptionStatus::Unsupported => write!(f, "unsupported"),
            EncryptionStatus::Inactive => write!(f, "inactive"),
            EncryptionStatus::Activating => write!(f, "activating"),
            EncryptionStatus::Active => write!(f, "active"),
            EncryptionStatus::ActiveDefaultKey => write!(f, "active (default key)"),
            EncryptionStatus::ActivePerUser => write!(f, "active (per user)"),
        }
    }
}

/// The runtime environment a check inspects.
///
/// Every probe returns `None` when the environment cannot answer it. Checks
/// treat a missing answer as an invalid environment rather than as a pass or
/// a fail. Executors only pass the environment through.
pub trait Environment: Send + Sync {
    /// Human-readable name of the environment (device model, hostname, ...)
    fn name(&self) -> &str;

    /// Storage encryption state
    fn storage_encryption(&self) -> Option<EncryptionStatus> {
        None
    }

    /// Whether a debugger is attached to the current process
    fn debugger_attached(&self) -> Option<bool> {
        None
    }

    /// Evidence of root access (su binaries, writable system paths, ...)
    fn root_indicators(&self) -> Option<Vec<String>> {
        None
    }

    /// Whether developer options are switched on
    fn developer_mode_enabled(&self) -> Option<bool> {
        None
    }

    /// Evidence that the environment is an emulator or virtual machine
    fn emulator_indicators(&self) -> Option<Vec<String>> {
        None
    }

    /// Whether a screen lock (PIN, pattern, biometrics) is configured
    fn device_lock_enabled(&self) -> Option<bool> {
        None
    }

    /// Whether the application allows its data to be backed up
    fn backup_allowed(&self) -> Option<bool> {
        None
    }
}

impl<E: Environment + ?Sized> Environment for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn storage_encryption(&self) -> Option<EncryptionStatus> {
        (**self).storage_encryption()
    }

    fn debugger_attached(&self) -> Option<bool> {
        (**self).debugger_attached()
    }

    fn root_indicators(&self) -> Option<Vec<String>> {
        (**self).root_indicators()
    }

    fn developer_mode_enabled(&self) -> Option<bool> {
        (**self).developer_mode_enabled()
    }

    fn emulator_indicators(&self) -> Option<Vec<String>> {
        (**self).emulator_indicators()
    }

    fn device_lock_enabled(&self) -> Option<bool> {
        (**self).device_lock_enabled()
    }

    fn backup_allowed(&self) -> Option<bool> {
        (**self).backup_allowed()
    }
}

/// A security check that can be evaluated against an environment
pub trait SecurityCheck: Send + Sync {
    /// Unique identifier for this check; used as the result key
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Evaluate the check.
    ///
    /// Returns [`CheckError::InvalidEnvironment`] when the environment does
    /// not expose what the check needs.
    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError>;
}

impl<C: SecurityCheck + ?Sized> SecurityCheck for Arc<C> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        (**self).test(env)
    }
}

/// Sink that records check outcomes for telemetry.
///
/// Publication is best effort. Implementations must be safe to call from
/// several worker threads at once.
pub trait MetricsService: Send + Sync {
    /// Publish a single result
    fn publish(&self, result: &SecurityCheckResult) -> Result<(), MetricsError>;
}
