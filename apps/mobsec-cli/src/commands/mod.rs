//! CLI command implementations

pub mod info;
pub mod list;
pub mod scan;

use anyhow::Context;
use mobsec_core::Environment;
use mobsec_platform::{HostEnvironment, SnapshotEnvironment};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Load the snapshot at `snapshot`, or probe the local host
pub fn load_environment(snapshot: Option<&Path>) -> anyhow::Result<Arc<dyn Environment>> {
    match snapshot {
        Some(path) => {
            info!("Loading environment snapshot from {}", path.display());
            let env = SnapshotEnvironment::from_file(path)
                .with_context(|| format!("failed to load snapshot {}", path.display()))?;
            Ok(Arc::new(env))
        }
        None => {
            info!("Probing local host environment");
            Ok(Arc::new(HostEnvironment::detect()))
        }
    }
}
