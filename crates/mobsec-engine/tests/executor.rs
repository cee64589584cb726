//! Executor contract tests

use mobsec_checks::SecurityCheckType;
use mobsec_core::{
    BuildError, CheckError, EncryptionStatus, Environment, MetricsError, MetricsService,
    SecurityCheck, SecurityCheckResult,
};
use mobsec_engine::{
    fixed_thread_pool, report_from_handles, ExecutorService, Job, SecurityCheckExecutor,
};
use mobsec_platform::SnapshotEnvironment;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

struct FixedCheck {
    id: &'static str,
    passed: bool,
    runs: AtomicUsize,
}

impl FixedCheck {
    fn new(id: &'static str, passed: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            passed,
            runs: AtomicUsize::new(0),
        })
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl SecurityCheck for FixedCheck {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.id
    }

    fn test(&self, _env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(SecurityCheckResult::new(self.id, self.id, self.passed))
    }
}

struct FailingCheck;

impl SecurityCheck for FailingCheck {
    fn id(&self) -> &str {
        "failing"
    }

    fn name(&self) -> &str {
        "Failing"
    }

    fn test(&self, _env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        Err(CheckError::probe("failing", "probe unavailable"))
    }
}

struct PanickingCheck;

impl SecurityCheck for PanickingCheck {
    fn id(&self) -> &str {
        "panicking"
    }

    fn name(&self) -> &str {
        "Panicking"
    }

    fn test(&self, _env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        panic!("probe crashed")
    }
}

/// Blocks until released through the paired sender
struct GatedCheck {
    gate: Mutex<mpsc::Receiver<()>>,
}

impl SecurityCheck for GatedCheck {
    fn id(&self) -> &str {
        "gated"
    }

    fn name(&self) -> &str {
        "Gated"
    }

    fn test(&self, _env: &dyn Environment) -> Result<SecurityCheckResult, CheckError> {
        let gate = self
            .gate
            .lock()
            .map_err(|_| CheckError::probe("gated", "gate poisoned"))?;
        gate.recv()
            .map_err(|_| CheckError::probe("gated", "gate closed"))?;
        Ok(SecurityCheckResult::new("gated", "Gated", true))
    }
}

#[derive(Default)]
struct RecordingMetrics {
    published: Mutex<Vec<SecurityCheckResult>>,
}

impl RecordingMetrics {
    fn published(&self) -> Vec<SecurityCheckResult> {
        self.published.lock().unwrap().clone()
    }
}

impl MetricsService for RecordingMetrics {
    fn publish(&self, result: &SecurityCheckResult) -> Result<(), MetricsError> {
        self.published.lock().unwrap().push(result.clone());
        Ok(())
    }
}

struct BrokenMetrics {
    calls: AtomicUsize,
    panic: bool,
}

impl MetricsService for BrokenMetrics {
    fn publish(&self, _result: &SecurityCheckResult) -> Result<(), MetricsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic {
            panic!("sink crashed");
        }
        Err(MetricsError::Unavailable("collector offline".to_string()))
    }
}

/// A pool that was shut down: jobs are dropped unrun
struct ClosedPool;

impl ExecutorService for ClosedPool {
    fn submit(&self, _job: Job) {}
}

fn environment() -> Arc<dyn Environment> {
    Arc::new(SnapshotEnvironment::new("test-device"))
}

fn pool(threads: usize) -> Arc<rayon::ThreadPool> {
    Arc::new(fixed_thread_pool(threads).unwrap())
}

#[test]
fn test_execute_sync() {
    let check = FixedCheck::new("mock", true);
    let results = SecurityCheckExecutor::new_sync_executor(environment())
        .with_shared_security_check(check.clone())
        .build()
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results.contains_key("mock"));
    assert!(results["mock"].passed());
}

#[test]
fn test_execute_async() {
    let check = FixedCheck::new("mock", true);
    let mut results = SecurityCheckExecutor::new_async_executor(environment())
        .with_shared_security_check(check.clone())
        .with_executor_service(pool(1))
        .build()
        .unwrap()
        .execute();

    assert_eq!(results.len(), 1);
    let handle = results.remove("mock").unwrap();
    assert_eq!(handle.check_id(), "mock");
    let result = handle.get().unwrap();
    assert!(result.passed());
    assert_eq!(result.check_id(), "mock");
}

#[test]
fn test_send_metrics_sync() {
    let metrics = Arc::new(RecordingMetrics::default());
    SecurityCheckExecutor::new_sync_executor(environment())
        .with_shared_security_check(FixedCheck::new("mock", true))
        .with_metrics_service(metrics.clone())
        .build()
        .unwrap()
        .execute()
        .unwrap();

    let published = metrics.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].check_id(), "mock");
}

#[test]
fn test_send_metrics_async() {
    let metrics = Arc::new(RecordingMetrics::default());
    let results = SecurityCheckExecutor::new_async_executor(environment())
        .with_shared_security_check(FixedCheck::new("mock", true))
        .with_metrics_service(metrics.clone())
        .with_executor_service(pool(1))
        .build()
        .unwrap()
        .execute();

    assert_eq!(results.len(), 1);
    for handle in results.into_values() {
        handle.get().unwrap();
    }

    // Publication happens on the worker before the result is delivered
    let published = metrics.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].check_id(), "mock");
}

#[test]
fn test_metrics_published_once_per_check_per_execute() {
    let metrics = Arc::new(RecordingMetrics::default());
    let executor = SecurityCheckExecutor::new_async_executor(environment())
        .with_shared_security_check(FixedCheck::new("a", true))
        .with_shared_security_check(FixedCheck::new("b", false))
        .with_shared_security_check(FixedCheck::new("c", true))
        .with_metrics_service(metrics.clone())
        .with_executor_service(pool(3))
        .build()
        .unwrap();

    for _ in 0..2 {
        for handle in executor.execute().into_values() {
            handle.get().unwrap();
        }
    }

    let mut ids: Vec<_> = metrics
        .published()
        .iter()
        .map(|r| r.check_id().to_string())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "a", "b", "b", "c", "c"]);
}

#[test]
fn test_mapping_size_matches_distinct_checks() {
    let executor = SecurityCheckExecutor::new_sync_executor(environment())
        .with_shared_security_check(FixedCheck::new("a", true))
        .with_shared_security_check(FixedCheck::new("b", false))
        .with_shared_security_check(FixedCheck::new("c", true))
        .build()
        .unwrap();

    let results = executor.execute().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results["a"].passed());
    assert!(!results["b"].passed());
    assert!(results["c"].passed());
}

const IDS: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

#[test]
fn test_mapping_size_for_each_count_sync() {
    for k in 1..=IDS.len() {
        let mut builder = SecurityCheckExecutor::new_sync_executor(environment());
        for id in &IDS[..k] {
            builder = builder.with_shared_security_check(FixedCheck::new(id, true));
        }

        let results = builder.build().unwrap().execute().unwrap();
        assert_eq!(results.len(), k);
        for id in &IDS[..k] {
            assert_eq!(results[*id].check_id(), *id);
        }
    }
}

#[test]
fn test_mapping_size_for_each_count_async() {
    let pool = pool(3);
    for k in 1..=IDS.len() {
        let mut builder =
            SecurityCheckExecutor::new_async_executor(environment()).with_executor_service(pool.clone());
        for id in &IDS[..k] {
            builder = builder.with_shared_security_check(FixedCheck::new(id, false));
        }

        let mut handles = builder.build().unwrap().execute();
        assert_eq!(handles.len(), k);
        for id in &IDS[..k] {
            let result = handles.remove(*id).unwrap().get().unwrap();
            assert_eq!(result.check_id(), *id);
            assert!(!result.passed());
        }
    }
}

#[test]
fn test_duplicate_registration_last_wins() {
    let first = FixedCheck::new("dup", true);
    let second = FixedCheck::new("dup", false);

    let results = SecurityCheckExecutor::new_sync_executor(environment())
        .with_shared_security_check(first.clone())
        .with_shared_security_check(second.clone())
        .build()
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(!results["dup"].passed());
    assert_eq!(first.runs(), 0);
    assert_eq!(second.runs(), 1);

    let results = SecurityCheckExecutor::new_async_executor(environment())
        .with_shared_security_check(FixedCheck::new("dup", false))
        .with_shared_security_check(FixedCheck::new("dup", true))
        .with_executor_service(pool(2))
        .build()
        .unwrap()
        .execute();

    assert_eq!(results.len(), 1);
    let result = results.into_values().next().unwrap().get().unwrap();
    assert!(result.passed());
}

#[test]
fn test_build_requires_checks() {
    let err = SecurityCheckExecutor::new_sync_executor(environment())
        .build()
        .err();
    assert_eq!(err, Some(BuildError::NoSecurityChecks));

    let err = SecurityCheckExecutor::new_async_executor(environment())
        .with_executor_service(pool(1))
        .build()
        .err();
    assert_eq!(err, Some(BuildError::NoSecurityChecks));
}

#[test]
fn test_build_async_requires_executor_service() {
    let err = SecurityCheckExecutor::new_async_executor(environment())
        .with_security_check(SecurityCheckType::Rooted)
        .build()
        .err();
    assert_eq!(err, Some(BuildError::MissingExecutorService));
}

#[test]
fn test_sync_check_error_aborts_run() {
    let before = FixedCheck::new("before", true);
    let after = FixedCheck::new("after", true);
    let metrics = Arc::new(RecordingMetrics::default());

    let err = SecurityCheckExecutor::new_sync_executor(environment())
        .with_shared_security_check(before.clone())
        .with_security_check(FailingCheck)
        .with_shared_security_check(after.clone())
        .with_metrics_service(metrics.clone())
        .build()
        .unwrap()
        .execute()
        .unwrap_err();

    assert_eq!(err.check_id(), "failing");
    assert_eq!(before.runs(), 1);
    assert_eq!(after.runs(), 0);
    assert_eq!(metrics.published().len(), 1);
}

#[test]
fn test_async_failures_are_isolated() {
    let metrics = Arc::new(RecordingMetrics::default());
    let mut results = SecurityCheckExecutor::new_async_executor(environment())
        .with_security_check(FailingCheck)
        .with_security_check(PanickingCheck)
        .with_shared_security_check(FixedCheck::new("ok", true))
        .with_metrics_service(metrics.clone())
        .with_executor_service(pool(2))
        .build()
        .unwrap()
        .execute();

    assert_eq!(results.len(), 3);

    let err = results.remove("failing").unwrap().get().unwrap_err();
    assert!(matches!(err, CheckError::Probe { .. }));

    let err = results.remove("panicking").unwrap().get().unwrap_err();
    assert!(matches!(err, CheckError::Panicked { ref message, .. } if message == "probe crashed"));

    assert!(results.remove("ok").unwrap().get().unwrap().passed());
    assert_eq!(metrics.published().len(), 1);
}

#[test]
fn test_metrics_failures_do_not_affect_results() {
    for panic in [false, true] {
        let metrics = Arc::new(BrokenMetrics {
            calls: AtomicUsize::new(0),
            panic,
        });

        let results = SecurityCheckExecutor::new_sync_executor(environment())
            .with_shared_security_check(FixedCheck::new("a", true))
            .with_shared_security_check(FixedCheck::new("b", true))
            .with_metrics_service(metrics.clone())
            .build()
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(results.len(), 2);

        let handles = SecurityCheckExecutor::new_async_executor(environment())
            .with_shared_security_check(FixedCheck::new("a", true))
            .with_metrics_service(metrics.clone())
            .with_executor_service(pool(1))
            .build()
            .unwrap()
            .execute();
        for handle in handles.into_values() {
            assert!(handle.get().unwrap().passed());
        }

        assert_eq!(metrics.calls.load(Ordering::SeqCst), 3);
    }
}

#[test]
fn test_execute_reruns_checks() {
    let check = FixedCheck::new("mock", true);
    let executor = SecurityCheckExecutor::new_sync_executor(environment())
        .with_shared_security_check(check.clone())
        .build()
        .unwrap();

    executor.execute().unwrap();
    executor.execute().unwrap();
    assert_eq!(check.runs(), 2);
}

#[test]
fn test_handle_timeout_then_resolves() {
    let (release, gate) = mpsc::channel();
    let pool = pool(1);
    let results = SecurityCheckExecutor::new_async_executor(environment())
        .with_security_check(GatedCheck {
            gate: Mutex::new(gate),
        })
        .with_executor_service(pool.clone())
        .build()
        .unwrap()
        .execute();

    let handle = &results["gated"];
    let err = handle.get_timeout(Duration::from_millis(20)).unwrap_err();
    assert!(matches!(err, CheckError::Timeout { .. }));

    release.send(()).unwrap();
    assert!(handle.get_timeout(Duration::from_secs(5)).unwrap().passed());
    assert!(handle.is_finished());
}

#[test]
fn test_closed_pool_abandons_handles() {
    let results = SecurityCheckExecutor::new_async_executor(environment())
        .with_shared_security_check(FixedCheck::new("mock", true))
        .with_executor_service(Arc::new(ClosedPool))
        .build()
        .unwrap()
        .execute();

    let err = results.into_values().next().unwrap().get().unwrap_err();
    assert!(matches!(err, CheckError::Abandoned { .. }));
}

#[test]
fn test_catalog_checks_against_snapshot() {
    let env = SnapshotEnvironment::new("pixel-7")
        .with_storage_encryption(EncryptionStatus::Active)
        .with_root_indicators(vec![])
        .with_debugger_attached(true);

    let handles = SecurityCheckExecutor::new_async_executor(Arc::new(env))
        .with_security_check(SecurityCheckType::Encryption)
        .with_security_check(SecurityCheckType::Rooted)
        .with_security_check(SecurityCheckType::Debugger)
        .with_security_check(SecurityCheckType::ScreenLock)
        .with_executor_service(pool(2))
        .build()
        .unwrap()
        .execute();

    let report = report_from_handles("pixel-7", handles, Some(Duration::from_secs(5)));
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.passed, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.errored, 1);
    assert_eq!(report.errors[0].check_id, "screen_lock");
}
