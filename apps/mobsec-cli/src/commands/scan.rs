//! Security check scan command

use anyhow::Context;
use clap::{Args, ValueEnum};
use mobsec_checks::{resolve_check_types, SecurityCheckType};
use mobsec_core::{
    Config, Environment, ExecutionMode, MetricsService, MetricsSinkKind, SecurityReport,
};
use mobsec_engine::{
    fixed_thread_pool, format_json, format_text, report_from_error, report_from_handles,
    report_from_results, JsonLinesMetricsService, SecurityCheckExecutor, TracingMetricsService,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone, Copy, ValueEnum)]
enum MetricsArg {
    None,
    Log,
    Jsonl,
}

impl From<MetricsArg> for MetricsSinkKind {
    fn from(arg: MetricsArg) -> Self {
        match arg {
            MetricsArg::None => MetricsSinkKind::None,
            MetricsArg::Log => MetricsSinkKind::Log,
            MetricsArg::Jsonl => MetricsSinkKind::Jsonl,
        }
    }
}

#[derive(Args)]
pub struct ScanArgs {
    /// Run checks concurrently on a worker pool
    #[arg(long = "async")]
    run_async: bool,

    /// Worker pool size for concurrent runs
    #[arg(long)]
    threads: Option<usize>,

    /// Checks to run (default: all)
    #[arg(long, value_delimiter = ',')]
    checks: Vec<String>,

    /// Checks to skip
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,

    /// Device snapshot to check instead of the local host
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Where to publish results
    #[arg(long, value_enum)]
    metrics: Option<MetricsArg>,

    /// Output file for the jsonl metrics sink
    #[arg(long)]
    metrics_path: Option<PathBuf>,

    /// Seconds to wait for each check in concurrent runs
    #[arg(long)]
    timeout: Option<u64>,
}

impl ScanArgs {
    /// Apply command line overrides on top of the configuration file
    fn apply(&self, config: &mut Config) {
        if self.run_async {
            config.general.mode = ExecutionMode::Async;
        }
        if let Some(threads) = self.threads {
            config.general.worker_threads = threads;
        }
        if !self.checks.is_empty() {
            config.checks.enabled = self.checks.clone();
        }
        config.checks.skip.extend(self.skip.iter().cloned());
        if let Some(snapshot) = &self.snapshot {
            config.environment.snapshot = Some(snapshot.clone());
        }
        if let Some(metrics) = self.metrics {
            config.metrics.sink = metrics.into();
        }
        if let Some(path) = &self.metrics_path {
            config.metrics.path = Some(path.clone());
        }
    }
}

/// Pick catalog checks according to the configuration.
///
/// Without an explicit `enabled` list, only checks the environment can
/// answer are run, so a sync run over the live host does not abort on a
/// probe the host lacks. Explicitly enabled checks always run.
fn selected_checks(
    config: &Config,
    environment: &dyn Environment,
) -> anyhow::Result<Vec<SecurityCheckType>> {
    let skip = resolve_check_types(&config.checks.skip).map_err(anyhow::Error::msg)?;

    let candidates = if config.checks.enabled.is_empty() {
        let (answered, unanswered): (Vec<_>, Vec<_>) = SecurityCheckType::all()
            .iter()
            .copied()
            .partition(|ty| ty.is_answered_by(environment));
        for ty in unanswered {
            info!("Skipping {}: {} cannot answer it", ty, environment.name());
        }
        answered
    } else {
        resolve_check_types(&config.checks.enabled).map_err(anyhow::Error::msg)?
    };

    Ok(candidates
        .into_iter()
        .filter(|ty| !skip.contains(ty))
        .collect())
}

fn metrics_service(config: &Config) -> anyhow::Result<Option<Arc<dyn MetricsService>>> {
    let sink: Arc<dyn MetricsService> = match config.metrics.sink {
        MetricsSinkKind::None => return Ok(None),
        MetricsSinkKind::Log => Arc::new(TracingMetricsService),
        MetricsSinkKind::Jsonl => {
            let path = config
                .metrics
                .path
                .as_deref()
                .context("the jsonl metrics sink needs --metrics-path")?;
            let sink = JsonLinesMetricsService::append_to(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Arc::new(sink)
        }
    };
    Ok(Some(sink))
}

pub fn run(args: ScanArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let environment = super::load_environment(config.environment.snapshot.as_deref())?;
    let checks = selected_checks(&config, environment.as_ref())?;
    let metrics = metrics_service(&config)?;
    let env_name = environment.name().to_string();

    let report: SecurityReport = match config.general.mode {
        ExecutionMode::Sync => {
            let mut builder = SecurityCheckExecutor::new_sync_executor(environment);
            for check in checks {
                builder = builder.with_security_check(check);
            }
            if let Some(metrics) = metrics {
                builder = builder.with_metrics_service(metrics);
            }

            match builder.build()?.execute() {
                Ok(results) => report_from_results(&env_name, results),
                Err(e) => report_from_error(&env_name, &e),
            }
        }
        ExecutionMode::Async => {
            let pool = Arc::new(fixed_thread_pool(config.general.worker_threads)?);
            info!("Using {} worker threads", pool.current_num_threads());

            let mut builder = SecurityCheckExecutor::new_async_executor(environment)
                .with_executor_service(pool.clone());
            for check in checks {
                builder = builder.with_security_check(check);
            }
            if let Some(metrics) = metrics {
                builder = builder.with_metrics_service(metrics);
            }

            let handles = builder.build()?.execute();
            report_from_handles(&env_name, handles, args.timeout.map(Duration::from_secs))
        }
    };

    match config.general.output_format.as_str() {
        "json" => println!("{}", format_json(&report, true)?),
        _ => println!("{}", format_text(&report)),
    }

    // Exit with error code if any check did not pass
    if !report.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}
