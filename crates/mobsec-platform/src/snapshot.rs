//! Environment built from a recorded device snapshot

use mobsec_core::{EncryptionStatus, Environment, MobsecError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Device state captured elsewhere (typically by an on-device agent) and
/// replayed to the checks.
///
/// Probes that were not captured are `None` and make the corresponding
/// checks fail with an invalid environment error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvironment {
    /// Device name
    pub name: String,

    #[serde(default)]
    pub storage_encryption: Option<EncryptionStatus>,

    #[serde(default)]
    pub debugger_attached: Option<bool>,

    #[serde(default)]
    pub root_indicators: Option<Vec<String>>,

    #[serde(default)]
    pub developer_mode_enabled: Option<bool>,

    #[serde(default)]
    pub emulator_indicators: Option<Vec<String>>,

    #[serde(default)]
    pub device_lock_enabled: Option<bool>,

    #[serde(default)]
    pub backup_allowed: Option<bool>,
}

impl SnapshotEnvironment {
    /// Create an empty snapshot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a snapshot from a YAML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let parsed = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| MobsecError::Parse {
            context: path.display().to_string(),
            message,
        })
    }

    pub fn with_storage_encryption(mut self, status: EncryptionStatus) -> Self {
        self.storage_encryption = Some(status);
        self
    }

    pub fn with_debugger_attached(mut self, attached: bool) -> Self {
        self.debugger_attached = Some(attached);
        self
    }

    pub fn with_root_indicators(mut self, indicators: Vec<String>) -> Self {
        self.root_indicators = Some(indicators);
        self
    }

    pub fn with_developer_mode(mut self, enabled: bool) -> Self {
        self.developer_mode_enabled = Some(enabled);
        self
    }

    pub fn with_emulator_indicators(mut self, indicators: Vec<String>) -> Self {
        self.emulator_indicators = Some(indicators);
        self
    }

    pub fn with_device_lock(mut self, enabled: bool) -> Self {
        self.device_lock_enabled = Some(enabled);
        self
    }

    pub fn with_backup_allowed(mut self, allowed: bool) -> Self {
        self.backup_allowed = Some(allowed);
        self
    }
}

impl Environment for SnapshotEnvironment {
    fn name(&self) -> &str {
        &self.name
    }

    fn storage_encryption(&self) -> Option<EncryptionStatus> {
        self.storage_encryption
    }

    fn debugger_attached(&self) -> Option<bool> {
        self.debugger_attached
    }

    fn root_indicators(&self) -> Option<Vec<String>> {
        self.root_indicators.clone()
    }

    fn developer_mode_enabled(&self) -> Option<bool> {
        self.developer_mode_enabled
    }

    fn emulator_indicators(&self) -> Option<Vec<String>> {
        self.emulator_indicators.clone()
    }

    fn device_lock_enabled(&self) -> Option<bool> {
        self.device_lock_enabled
    }

    fn backup_allowed(&self) -> Option<bool> {
        self.backup_allowed
    }
}
