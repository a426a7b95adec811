use std::io::Write;
use std::time::Duration;

use oss_core::{ClockSink, SchedulerConfig, VirtualClock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::admission::{AdmissionCounters, AdmissionPolicy};
use crate::pcb::PcbTable;
use crate::spawner::TaskSpawner;
use crate::types::SchedulerState;
use crate::watchdog::Watchdog;

/// The scheduler. Owns the clock, the PCB table and the admission counters;
/// nothing else writes them.
pub struct Scheduler<S: TaskSpawner, C: ClockSink> {
    pub(super) config: SchedulerConfig,
    pub(super) policy: AdmissionPolicy,
    /// Authoritative clock value; published to `sink` after every advance.
    pub(super) clock: VirtualClock,
    pub(super) sink: C,
    pub(super) table: PcbTable,
    pub(super) counters: AdmissionCounters,
    pub(super) spawner: S,
    pub(super) rng: StdRng,
    pub(super) watchdog: Watchdog,
    pub(super) state: SchedulerState,
    pub(super) last_report: VirtualClock,
    /// Destination for status tables. `None` disables reporting.
    pub(super) report_out: Option<Box<dyn Write>>,
    pub(super) pid: u32,
    pub(super) ticks: u64,
    pub(super) reaped: u32,
    pub(super) killed: u32,
}

impl<S: TaskSpawner, C: ClockSink> Scheduler<S, C> {
    /// Create a scheduler. The watchdog starts counting now.
    pub fn new(config: SchedulerConfig, sink: C, spawner: S) -> Self {
        let policy = AdmissionPolicy::from_config(&config);
        let watchdog = Watchdog::start(config.watchdog());
        sink.publish(VirtualClock::ZERO);
        info!(
            quota = policy.task_quota,
            ceiling = policy.concurrency_ceiling,
            time_limit_secs = policy.time_limit_secs,
            min_interval_ns = policy.min_interval_nanos,
            "scheduler created"
        );
        Self {
            config,
            policy,
            clock: VirtualClock::ZERO,
            sink,
            table: PcbTable::new(),
            counters: AdmissionCounters::default(),
            spawner,
            rng: StdRng::from_entropy(),
            watchdog,
            state: SchedulerState::Running,
            last_report: VirtualClock::ZERO,
            report_out: Some(Box::new(std::io::stdout())),
            pid: std::process::id(),
            ticks: 0,
            reaped: 0,
            killed: 0,
        }
    }

    /// Use a deterministic lifetime generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the watchdog limit, restarting its timer.
    pub fn with_watchdog(mut self, limit: Duration) -> Self {
        self.watchdog = Watchdog::start(limit);
        self
    }

    /// Send status tables somewhere other than stdout, or nowhere.
    pub fn with_report_writer(mut self, out: Option<Box<dyn Write>>) -> Self {
        self.report_out = out;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn clock(&self) -> VirtualClock {
        self.clock
    }

    pub fn table(&self) -> &PcbTable {
        &self.table
    }

    pub fn counters(&self) -> &AdmissionCounters {
        &self.counters
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
