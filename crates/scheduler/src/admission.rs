//! Admission control: quota, concurrency ceiling, launch pacing and slot
//! availability, all evaluated fresh on every loop iteration.

use oss_core::{SchedulerConfig, VirtualClock, WorkerLifetime, NANOS_PER_SEC};
use rand::Rng;

use crate::pcb::{PcbTable, SlotIndex};

/// Scheduler-local launch bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdmissionCounters {
    pub total_launched: u32,
    /// Always equal to the number of occupied PCB slots.
    pub currently_running: u32,
    /// Clock value of the most recent launch. Starts at zero, so the first
    /// launch also waits one full interval.
    pub last_launch: VirtualClock,
}

impl AdmissionCounters {
    pub fn record_launch(&mut self, now: VirtualClock) {
        self.total_launched += 1;
        self.currently_running += 1;
        self.last_launch = now;
    }

    pub fn record_exit(&mut self) {
        self.currently_running = self.currently_running.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit(SlotIndex),
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    QuotaReached,
    ConcurrencyCeiling,
    /// Virtual nanoseconds still to wait before the next launch.
    Pacing { remaining_ns: u64 },
    TableFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub task_quota: u32,
    pub concurrency_ceiling: u32,
    pub min_interval_nanos: u64,
    pub time_limit_secs: u64,
}

impl AdmissionPolicy {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            task_quota: config.task_quota,
            concurrency_ceiling: config.concurrency_ceiling,
            min_interval_nanos: config.min_interval_nanos(),
            time_limit_secs: config.time_limit_secs,
        }
    }

    pub fn quota_reached(&self, counters: &AdmissionCounters) -> bool {
        counters.total_launched >= self.task_quota
    }

    /// Decide whether a worker may be spawned right now, and into which slot.
    pub fn evaluate(
        &self,
        counters: &AdmissionCounters,
        now: VirtualClock,
        table: &PcbTable,
    ) -> Admission {
        if self.quota_reached(counters) {
            return Admission::Deny(DenyReason::QuotaReached);
        }
        if counters.currently_running >= self.concurrency_ceiling {
            return Admission::Deny(DenyReason::ConcurrencyCeiling);
        }
        let since_last = now.nanos_since(counters.last_launch);
        if since_last < self.min_interval_nanos {
            return Admission::Deny(DenyReason::Pacing {
                remaining_ns: self.min_interval_nanos - since_last,
            });
        }
        match table.find_free_slot() {
            Some(slot) => Admission::Admit(slot),
            None => Admission::Deny(DenyReason::TableFull),
        }
    }

    /// Draw a lifetime in `[1, time_limit]` seconds plus `[0, 1e9)` nanoseconds.
    pub fn random_lifetime<R: Rng + ?Sized>(&self, rng: &mut R) -> WorkerLifetime {
        WorkerLifetime {
            seconds: rng.gen_range(1..=self.time_limit_secs.max(1)),
            nanoseconds: rng.gen_range(0..NANOS_PER_SEC as u32),
        }
    }
}
