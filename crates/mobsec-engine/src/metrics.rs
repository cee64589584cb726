//! Metrics dispatch and the built-in metrics sinks

use mobsec_core::{MetricsError, MetricsService, SecurityCheckResult};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Hand a result to a sink without letting the sink affect the caller.
///
/// Errors and panics raised by the sink are logged and dropped.
pub(crate) fn publish_quietly(sink: &dyn MetricsService, result: &SecurityCheckResult) {
    match catch_unwind(AssertUnwindSafe(|| sink.publish(result))) {
        Ok(Ok(())) => debug!("Published metrics for check {}", result.check_id()),
        Ok(Err(e)) => warn!(
            "Failed to publish metrics for check {}: {}",
            result.check_id(),
            e
        ),
        Err(payload) => warn!(
            "Metrics sink panicked while publishing check {}: {}",
            result.check_id(),
            panic_message(payload.as_ref())
        ),
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Metric record emitted for each check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityMetric {
    pub check_id: String,
    pub check_name: String,
    pub passed: bool,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl From<&SecurityCheckResult> for SecurityMetric {
    fn from(result: &SecurityCheckResult) -> Self {
        Self {
            check_id: result.check_id().to_string(),
            check_name: result.check_name().to_string(),
            passed: result.passed(),
            recorded_at: chrono::Utc::now(),
        }
    }
}

/// Publishes results as log events on the `mobsec::metrics` target
#[derive(Debug, Default)]
pub struct TracingMetricsService;

impl MetricsService for TracingMetricsService {
    fn publish(&self, result: &SecurityCheckResult) -> Result<(), MetricsError> {
        info!(
            target: "mobsec::metrics",
            check_id = result.check_id(),
            passed = result.passed(),
            "security check {} {}",
            result.check_name(),
            if result.passed() { "passed" } else { "failed" }
        );
        Ok(())
    }
}

/// Writes one JSON document per result
pub struct JsonLinesMetricsService<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesMetricsService<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> Result<W, MetricsError> {
        self.writer
            .into_inner()
            .map_err(|_| MetricsError::Unavailable("metrics writer lock poisoned".to_string()))
    }
}

impl JsonLinesMetricsService<File> {
    /// Append to the file at `path`, creating it if needed
    pub fn append_to(path: &Path) -> Result<Self, MetricsError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> MetricsService for JsonLinesMetricsService<W> {
    fn publish(&self, result: &SecurityCheckResult) -> Result<(), MetricsError> {
        let line = serde_json::to_string(&SecurityMetric::from(result))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| MetricsError::Unavailable("metrics writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}
