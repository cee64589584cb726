//! Configuration structures for mobsec

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for mobsec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Check selection
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Metrics publication
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Environment selection
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// How checks are executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run every check on the calling thread, in registration order
    #[default]
    Sync,
    /// Run every check on a worker pool
    Async,
}

/// General configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Output format (text, json)
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Execution mode
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Worker pool size for asynchronous execution
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            output_format: default_output_format(),
            mode: ExecutionMode::default(),
            worker_threads: default_worker_threads(),
        }
    }
}

fn default_output_format() -> String {
    "text".to_string()
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Which checks to run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Check ids to run; empty means every check the environment can answer
    #[serde(default)]
    pub enabled: Vec<String>,

    /// Check ids to leave out
    #[serde(default)]
    pub skip: Vec<String>,
}

/// Where results are published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsSinkKind {
    /// Do not publish
    #[default]
    None,
    /// Publish through the log
    Log,
    /// Append JSON lines to a file
    Jsonl,
}

/// Metrics configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Sink kind
    #[serde(default)]
    pub sink: MetricsSinkKind,

    /// Output file for the jsonl sink
    pub path: Option<PathBuf>,
}

/// Environment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Snapshot file describing the device; the live host is probed when absent
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let parsed: Result<Self, String> = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| crate::error::MobsecError::Parse {
            context: path.display().to_string(),
            message,
        })
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)
                .map_err(|e| crate::error::MobsecError::Serialization(e.to_string()))?
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that cannot produce a working executor
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.general.mode == ExecutionMode::Async && self.general.worker_threads == 0 {
            return Err(crate::error::MobsecError::Config(
                "worker_threads must be at least 1 in async mode".to_string(),
            ));
        }
        if self.metrics.sink == MetricsSinkKind::Jsonl && self.metrics.path.is_none() {
            return Err(crate::error::MobsecError::Config(
                "the jsonl metrics sink needs a path".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_json(path: &std::path::Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}
