//! oss — launches short-lived workers against a shared virtual clock.
//!
//! # Usage
//!
//! ```bash
//! # 5 workers total, at most 2 at once, lifetimes up to 3s, 100ms apart
//! oss -n 5 -s 2 -t 3 -i 100
//!
//! # Defaults from a TOML file, with a tighter watchdog
//! oss --config oss.toml --watchdog-secs 10
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use oss_core::{load_dotenv, ClockRegion, SchedulerConfig};
use oss_scheduler::{ProcessSpawner, RunOutcome, Scheduler};

/// Simulated OS scheduler: admits workers under a quota, a concurrency
/// ceiling and a launch interval, driven by a virtual clock.
#[derive(Parser, Debug)]
#[command(name = "oss", version, about)]
struct Cli {
    /// Total number of workers to launch.
    #[arg(short = 'n', long = "tasks")]
    tasks: Option<u32>,

    /// Maximum number of workers running at the same time.
    #[arg(short = 's', long = "simultaneous")]
    simultaneous: Option<u32>,

    /// Upper bound, in seconds, for each worker's randomized lifetime.
    #[arg(short = 't', long = "time-limit")]
    time_limit: Option<u64>,

    /// Minimum interval between launches, in milliseconds.
    #[arg(short = 'i', long = "interval-ms")]
    interval_ms: Option<u64>,

    /// Optional TOML file with scheduler defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Real-time limit for the whole run, in seconds.
    #[arg(long)]
    watchdog_secs: Option<u64>,

    /// Virtual nanoseconds added to the clock per iteration.
    #[arg(long)]
    quantum_ns: Option<u64>,

    /// Path to the worker executable.
    #[arg(long)]
    worker_bin: Option<PathBuf>,

    /// Path of the shared clock region file.
    #[arg(long)]
    region: Option<PathBuf>,

    /// Seed for worker lifetimes (random when omitted).
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Defaults, then `--config`, then `OSS_*` env, then flags.
    fn resolve_config(&self) -> oss_core::Result<SchedulerConfig> {
        let mut config = match &self.config {
            Some(path) => SchedulerConfig::from_file(path)?,
            None => SchedulerConfig::default(),
        };
        config.apply_env_overrides()?;

        if let Some(v) = self.tasks {
            config.task_quota = v;
        }
        if let Some(v) = self.simultaneous {
            config.concurrency_ceiling = v;
        }
        if let Some(v) = self.time_limit {
            config.time_limit_secs = v;
        }
        if let Some(v) = self.interval_ms {
            config.launch_interval_ms = v;
        }
        if let Some(v) = self.watchdog_secs {
            config.watchdog_secs = v;
        }
        if let Some(v) = self.quantum_ns {
            config.quantum_ns = v;
        }
        if let Some(v) = &self.worker_bin {
            config.worker_bin = Some(v.clone());
        }
        if let Some(v) = &self.region {
            config.region_path = Some(v.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn default_worker_bin() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the oss executable")?;
    Ok(exe.with_file_name(format!("worker{}", std::env::consts::EXE_SUFFIX)))
}

fn default_region_path() -> PathBuf {
    std::env::temp_dir().join(format!("oss-clock-{}", std::process::id()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid configuration")?;

    let worker_bin = match &config.worker_bin {
        Some(path) => path.clone(),
        None => default_worker_bin()?,
    };
    let region_path = config
        .region_path
        .clone()
        .unwrap_or_else(default_region_path);

    let region = ClockRegion::create(&region_path).context("failed to create clock region")?;
    info!(region = %region.path().display(), worker = %worker_bin.display(), "clock region ready");

    let spawner = ProcessSpawner::new(worker_bin, region.path());
    let mut scheduler = Scheduler::new(config, &region, spawner);
    if let Some(seed) = cli.seed {
        scheduler = scheduler.with_seed(seed);
    }

    let result = scheduler.run();
    drop(scheduler);

    if let Err(e) = region.release() {
        warn!(error = %e, "failed to release clock region");
    }

    let summary = result.context("scheduler aborted")?;
    if summary.outcome != RunOutcome::Completed {
        std::process::exit(summary.outcome.exit_code());
    }
    Ok(())
}
