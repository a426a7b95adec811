//! worker — a simulated task launched by `oss`.
//!
//! Takes its lifetime as two positional arguments and finds the shared clock
//! region through `OSS_CLOCK_REGION`.
//!
//! ```bash
//! OSS_CLOCK_REGION=/tmp/oss-clock-1234 worker 2 500000000
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use oss_core::{ClockRegion, WorkerLifetime};
use oss_worker::Worker;

/// Simulated task: runs until the shared virtual clock passes its deadline.
#[derive(Parser, Debug)]
#[command(name = "worker", version, about)]
struct Cli {
    /// Lifetime, whole seconds.
    seconds: u64,

    /// Lifetime, additional nanoseconds (below 1e9).
    nanoseconds: u32,

    /// Shared clock region created by the scheduler.
    #[arg(long, env = "OSS_CLOCK_REGION")]
    region: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let lifetime =
        WorkerLifetime::new(cli.seconds, cli.nanoseconds).context("invalid worker lifetime")?;
    let region = ClockRegion::open(&cli.region).context("failed to attach clock region")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    Worker::new(&region, lifetime)
        .run(&mut out)
        .context("failed to write worker status")?;

    region.release().context("failed to detach clock region")?;
    Ok(())
}
