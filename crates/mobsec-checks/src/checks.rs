//! Check implementations

use mobsec_core::{CheckError, Environment, SecurityCheck, SecurityCheckResult};

/// Turn a missing probe into an invalid environment error
fn require<T>(check: &dyn SecurityCheck, value: Option<T>, what: &str) -> Result<T, CheckError> {
    value.ok_or_else(|| {
        CheckError::invalid_environment(check.id(), format!("{} is not available", what))
    })
}

fn result(check: &dyn SecurityCheck, passed: bool, message: impl Into<String>) -> SecurityCheckResult {
    SecurityCheckResult::new(check.id(), check.name(), passed).with_message(message)
}

/// Fails when the device shows signs of root access
#[derive(Debug, Clone, Copy, Default)]
pub struct RootedCheck;

impl SecurityCheck for RootedCheck {
    fn id(&self) -> &str {
        "rooted"
    }

    fn name(&self) -> &str {
        "Rooted"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let indicators = require(self, env.root_indicators(), "root detection")?;
        Ok(if indicators.is_empty() {
            result(self, true, "no root indicators found")
        } else {
            result(self, false, format!("root indicators: {}", indicators.join(", ")))
        })
    }
}

/// Fails when a debugger is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct DebuggerCheck;

impl SecurityCheck for DebuggerCheck {
    fn id(&self) -> &str {
        "debugger"
    }

    fn name(&self) -> &str {
        "Debugger Attached"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let attached = require(self, env.debugger_attached(), "debugger state")?;
        Ok(if attached {
            result(self, false, "a debugger is attached")
        } else {
            result(self, true, "no debugger attached")
        })
    }
}

/// Fails when developer options are switched on
#[derive(Debug, Clone, Copy, Default)]
pub struct DeveloperModeCheck;

impl SecurityCheck for DeveloperModeCheck {
    fn id(&self) -> &str {
        "developer_mode"
    }

    fn name(&self) -> &str {
        "Developer Mode"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let enabled = require(self, env.developer_mode_enabled(), "developer mode setting")?;
        Ok(if enabled {
            result(self, false, "developer options are enabled")
        } else {
            result(self, true, "developer options are disabled")
        })
    }
}

/// Fails when the environment looks like an emulator
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatorCheck;

impl SecurityCheck for EmulatorCheck {
    fn id(&self) -> &str {
        "emulator"
    }

    fn name(&self) -> &str {
        "Emulator"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let indicators = require(self, env.emulator_indicators(), "emulator detection")?;
        Ok(if indicators.is_empty() {
            result(self, true, "running on physical hardware")
        } else {
            result(self, false, format!("emulator indicators: {}", indicators.join(", ")))
        })
    }
}

/// Passes only when storage is encrypted with a user-bound key
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptionCheck;

impl SecurityCheck for EncryptionCheck {
    fn id(&self) -> &str {
        "encryption"
    }

    fn name(&self) -> &str {
        "Device Encryption"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let status = require(self, env.storage_encryption(), "storage encryption status")?;
        Ok(result(
            self,
            status.is_user_protected(),
            format!("storage encryption is {}", status),
        ))
    }
}

/// Fails when no screen lock is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenLockCheck;

impl SecurityCheck for ScreenLockCheck {
    fn id(&self) -> &str {
        "screen_lock"
    }

    fn name(&self) -> &str {
        "Screen Lock"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let enabled = require(self, env.device_lock_enabled(), "screen lock setting")?;
        Ok(if enabled {
            result(self, true, "a screen lock is set")
        } else {
            result(self, false, "no screen lock is set")
        })
    }
}

/// Fails when application data may be backed up off the device
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowBackupFlagCheck;

impl SecurityCheck for AllowBackupFlagCheck {
    fn id(&self) -> &str {
        "allow_backup"
    }

    fn name(&self) -> &str {
        "Backup Flag"
    }

    fn test(&self, env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let allowed = require(self, env.backup_allowed(), "backup flag")?;
        Ok(if allowed {
            result(self, false, "application data can be backed up")
        } else {
            result(self, true, "application backups are disabled")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobsec_core::EncryptionStatus;
    use mobsec_platform::SnapshotEnvironment;

    #[test]
    fn test_encryption_enabled() {
        let env = SnapshotEnvironment::new("device").with_storage_encryption(EncryptionStatus::Active);
        let result = EncryptionCheck.test(&env).unwrap();
        assert!(result.passed());
        assert_eq!(result.check_id(), "encryption");
    }

    #[test]
    fn test_encryption_disabled() {
        let env =
            SnapshotEnvironment::new("device").with_storage_encryption(EncryptionStatus::Inactive);
        assert!(!EncryptionCheck.test(&env).unwrap().passed());

        let env = SnapshotEnvironment::new("device")
            .with_storage_encryption(EncryptionStatus::ActiveDefaultKey);
        assert!(!EncryptionCheck.test(&env).unwrap().passed());
    }

    #[test]
    fn test_encryption_without_status_is_invalid_environment() {
        let env = SnapshotEnvironment::new("device");
        let err = EncryptionCheck.test(&env).unwrap_err();
        assert!(matches!(err, CheckError::InvalidEnvironment { ref check, .. } if check == "encryption"));
    }

    #[test]
    fn test_rooted() {
        let clean = SnapshotEnvironment::new("device").with_root_indicators(vec![]);
        assert!(RootedCheck.test(&clean).unwrap().passed());

        let rooted = SnapshotEnvironment::new("device")
            .with_root_indicators(vec!["/system/xbin/su".to_string()]);
        let result = RootedCheck.test(&rooted).unwrap();
        assert!(!result.passed());
        assert!(result.message().unwrap().contains("/system/xbin/su"));
    }

    #[test]
    fn test_debugger_and_developer_mode() {
        let env = SnapshotEnvironment::new("device")
            .with_debugger_attached(true)
            .with_developer_mode(false);
        assert!(!DebuggerCheck.test(&env).unwrap().passed());
        assert!(DeveloperModeCheck.test(&env).unwrap().passed());
    }

    #[test]
    fn test_emulator_screen_lock_backup() {
        let env = SnapshotEnvironment::new("device")
            .with_emulator_indicators(vec!["ro.kernel.qemu=1".to_string()])
            .with_device_lock(true)
            .with_backup_allowed(true);
        assert!(!EmulatorCheck.test(&env).unwrap().passed());
        assert!(ScreenLockCheck.test(&env).unwrap().passed());
        assert!(!AllowBackupFlagCheck.test(&env).unwrap().passed());
    }
}
