//! Built-in device security checks for mobsec
//!
//! Every check reads a single probe from the [`Environment`] and turns it
//! into a pass/fail result. A probe the environment cannot answer fails the
//! check with [`CheckError::InvalidEnvironment`].
//!
//! # Example
//!
//! ```
//! use mobsec_checks::SecurityCheckType;
//!
//! for ty in SecurityCheckType::all() {
//!     println!("{}: {}", ty, ty.description());
//! }
//! ```

pub mod checks;

pub use checks::{
    AllowBackupFlagCheck, DebuggerCheck, DeveloperModeCheck, EmulatorCheck, EncryptionCheck,
    RootedCheck, ScreenLockCheck,
};

use mobsec_core::{CheckError, Environment, SecurityCheck, SecurityCheckResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Catalog of the built-in checks.
///
/// A type is itself a [`SecurityCheck`], so it can be registered with an
/// executor directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityCheckType {
    Rooted,
    Debugger,
    DeveloperMode,
    Emulator,
    Encryption,
    ScreenLock,
    AllowBackup,
}

impl SecurityCheckType {
    /// Every built-in check
    pub fn all() -> &'static [SecurityCheckType] {
        &[
            SecurityCheckType::Rooted,
            SecurityCheckType::Debugger,
            SecurityCheckType::DeveloperMode,
            SecurityCheckType::Emulator,
            SecurityCheckType::Encryption,
            SecurityCheckType::ScreenLock,
            SecurityCheckType::AllowBackup,
        ]
    }

    /// A shared instance of the check this type stands for
    pub fn security_check(&self) -> Arc<dyn SecurityCheck> {
        match self {
            SecurityCheckType::Rooted => Arc::new(RootedCheck),
            SecurityCheckType::Debugger => Arc::new(DebuggerCheck),
            SecurityCheckType::DeveloperMode => Arc::new(DeveloperModeCheck),
            SecurityCheckType::Emulator => Arc::new(EmulatorCheck),
            SecurityCheckType::Encryption => Arc::new(EncryptionCheck),
            SecurityCheckType::ScreenLock => Arc::new(ScreenLockCheck),
            SecurityCheckType::AllowBackup => Arc::new(AllowBackupFlagCheck),
        }
    }

    /// Whether `env` exposes the probe this check reads
    pub fn is_answered_by(&self, env: &dyn Environment) -> bool {
        match self {
            SecurityCheckType::Rooted => env.root_indicators().is_some(),
            SecurityCheckType::Debugger => env.debugger_attached().is_some(),
            SecurityCheckType::DeveloperMode => env.developer_mode_enabled().is_some(),
            SecurityCheckType::Emulator => env.emulator_indicators().is_some(),
            SecurityCheckType::Encryption => env.storage_encryption().is_some(),
            SecurityCheckType::ScreenLock => env.device_lock_enabled().is_some(),
            SecurityCheckType::AllowBackup => env.backup_allowed().is_some(),
        }
    }

    fn as_check(&self) -> &'static dyn SecurityCheck {
        match self {
            SecurityCheckType::Rooted => &RootedCheck,
            SecurityCheckType::Debugger => &DebuggerCheck,
            SecurityCheckType::DeveloperMode => &DeveloperModeCheck,
            SecurityCheckType::Emulator => &EmulatorCheck,
            SecurityCheckType::Encryption => &EncryptionCheck,
            SecurityCheckType::ScreenLock => &ScreenLockCheck,
            SecurityCheckType::AllowBackup => &AllowBackupFlagCheck,
        }
    }

    /// What the check verifies
    pub fn description(&self) -> &'static str {
        match self {
            SecurityCheckType::Rooted => "Detects su binaries and other evidence of root access",
            SecurityCheckType::Debugger => "Detects a debugger attached to the application",
            SecurityCheckType::DeveloperMode => "Detects enabled developer options",
            SecurityCheckType::Emulator => "Detects emulators and virtual machines",
            SecurityCheckType::Encryption => "Verifies that device storage is encrypted",
            SecurityCheckType::ScreenLock => "Verifies that a screen lock is configured",
            SecurityCheckType::AllowBackup => "Detects application data allowed into backups",
        }
    }
}

impl SecurityCheck for SecurityCheckType {
    fn id(&self) -> &str {
        self.as_check().id()
    }

    fn name(&self) -> &str {
        self.as_check().name()
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        self.as_check().test(env)
    }
}

impl std::fmt::Display for SecurityCheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for SecurityCheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SecurityCheckType::all()
            .iter()
            .copied()
            .find(|ty| ty.id() == wanted)
            .ok_or_else(|| format!("Unknown security check: {}", s))
    }
}

/// Resolve check ids into catalog entries.
///
/// Ids are matched case-insensitively and `-` stands for `_`. Duplicates are
/// dropped; the first unknown id is an error.
pub fn resolve_check_types<I, S>(ids: I) -> Result<Vec<SecurityCheckType>, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut types = Vec::new();
    for id in ids {
        let ty: SecurityCheckType = id.as_ref().parse()?;
        if types.contains(&ty) {
            debug!("Ignoring repeated check id {}", id.as_ref());
        } else {
            types.push(ty);
        }
    }
    Ok(types)
}
