//! mobsec core
//!
//! Core types, traits, and error handling shared by the mobsec check catalog,
//! environments and executors.

pub mod config;
pub mod error;
pub mod report;
pub mod traits;

pub use config::*;
pub use error::{BuildError, CheckError, MetricsError, MobsecError, Result};
pub use report::*;
pub use traits::*;
