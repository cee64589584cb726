//! Environment implementations for mobsec
//!
//! Provides the live host environment, recorded device snapshots and the
//! probing helpers behind them.

mod detection;
mod snapshot;

#[cfg(target_os = "linux")]
pub mod linux;

pub use detection::*;
pub use snapshot::SnapshotEnvironment;

use mobsec_core::{EncryptionStatus, Environment};
use tracing::debug;

/// Environment describing the machine mobsec runs on.
///
/// All probes run once, when the environment is created.
pub struct HostEnvironment {
    name: String,
    storage_encryption: Option<EncryptionStatus>,
    debugger_attached: Option<bool>,
    root_indicators: Vec<String>,
    emulator_indicators: Option<Vec<String>>,
}

impl HostEnvironment {
    /// Probe the current host
    pub fn detect() -> Self {
        let env = Self {
            name: hostname(),
            storage_encryption: detect_storage_encryption(),
            debugger_attached: detect_debugger(),
            root_indicators: detect_root_indicators(),
            emulator_indicators: detect_emulator_indicators(),
        };

        debug!(
            "Probed host {}: encryption={:?} debugger={:?} root_indicators={} emulator_indicators={:?}",
            env.name,
            env.storage_encryption,
            env.debugger_attached,
            env.root_indicators.len(),
            env.emulator_indicators.as_ref().map(Vec::len)
        );

        env
    }
}

impl Environment for HostEnvironment {
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
        Some(self.root_indicators.clone())
    }

    fn emulator_indicators(&self) -> Option<Vec<String>> {
        self.emulator_indicators.clone()
    }
}
