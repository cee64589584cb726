//! Execution engine for mobsec security checks
//!
//! Builds synchronous and asynchronous executors, runs registered checks
//! against an environment, publishes results to an optional metrics sink and
//! formats the outcome.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mobsec_checks::SecurityCheckType;
//! use mobsec_core::EncryptionStatus;
//! use mobsec_engine::SecurityCheckExecutor;
//! use mobsec_platform::SnapshotEnvironment;
//!
//! let env = SnapshotEnvironment::new("pixel-7").with_storage_encryption(EncryptionStatus::Active);
//! let results = SecurityCheckExecutor::new_sync_executor(Arc::new(env))
//!     .with_security_check(SecurityCheckType::Encryption)
//!     .build()
//!     .unwrap()
//!     .execute()
//!     .unwrap();
//! assert!(results["encryption"].passed());
//! ```

mod builder;
mod collect;
mod executor;
mod handle;
pub mod metrics;
mod output;
mod pool;

pub use builder::*;
pub use collect::*;
pub use executor::*;
pub use handle::*;
pub use metrics::{JsonLinesMetricsService, SecurityMetric, TracingMetricsService};
pub use output::*;
pub use pool::*;
