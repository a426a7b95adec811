use std::io::Write;

use oss_core::{ClockSink, Result};
use tracing::{debug, error, info, warn};

use crate::report::StatusReport;
use crate::spawner::TaskSpawner;
use crate::types::{RunOutcome, RunSummary, SchedulerState};

use super::Scheduler;

impl<S: TaskSpawner, C: ClockSink> Scheduler<S, C> {
    /// Run one loop iteration and return the resulting state.
    ///
    /// Order per iteration: watchdog check, advance and publish the clock,
    /// reap, report, admit, then evaluate termination. Once a final state is
    /// reached further calls do nothing.
    pub fn tick(&mut self) -> Result<SchedulerState> {
        if self.state.is_final() {
            return Ok(self.state);
        }
        if self.watchdog.expired() {
            self.watchdog_kill();
            return Ok(self.state);
        }

        self.clock.advance(self.config.quantum_ns);
        self.sink.publish(self.clock);
        self.ticks += 1;

        self.reap_finished();
        self.maybe_report();

        if let Err(e) = self.admit() {
            error!(error = %e, "spawn failed, terminating outstanding workers");
            self.terminate_all();
            return Err(e);
        }

        self.update_state();
        Ok(self.state)
    }

    /// Spin until every worker has been launched and reaped, or the watchdog fires.
    pub fn run(&mut self) -> Result<RunSummary> {
        info!(
            watchdog_secs = self.watchdog.limit().as_secs(),
            quantum_ns = self.config.quantum_ns,
            "scheduler loop starting"
        );
        if self.policy.concurrency_ceiling == 0 {
            warn!("concurrency ceiling is 0; no worker can start and the watchdog will end the run");
        }

        while !self.tick()?.is_final() {}

        self.report();
        let summary = self.summary();
        info!(
            outcome = ?summary.outcome,
            ticks = summary.ticks,
            launched = summary.launched,
            reaped = summary.reaped,
            killed = summary.killed,
            clock = %summary.final_clock,
            "scheduler loop finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            outcome: match self.state {
                SchedulerState::WatchdogKill => RunOutcome::WatchdogKill,
                _ => RunOutcome::Completed,
            },
            ticks: self.ticks,
            launched: self.counters.total_launched,
            reaped: self.reaped,
            killed: self.killed,
            final_clock: self.clock,
        }
    }

    fn update_state(&mut self) {
        let next = if !self.policy.quota_reached(&self.counters) {
            SchedulerState::Running
        } else if self.counters.currently_running == 0 {
            SchedulerState::Terminated
        } else {
            SchedulerState::Draining
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, clock = %self.clock, "state transition");
            self.state = next;
        }
    }

    fn watchdog_kill(&mut self) {
        warn!(
            elapsed_ms = self.watchdog.elapsed().as_millis() as u64,
            running = self.counters.currently_running,
            "watchdog expired, killing all workers"
        );
        self.state = SchedulerState::WatchdogKill;
        self.terminate_all();
    }

    /// Send a termination request to the task in every occupied slot.
    fn terminate_all(&mut self) {
        let victims: Vec<_> = self.table.occupied().collect();
        for (slot, task) in victims {
            if let Err(e) = self.spawner.terminate(task) {
                warn!(slot = slot.get(), task = %task, error = %e, "failed to terminate worker");
            }
            self.table.release(slot);
            self.counters.record_exit();
            self.killed += 1;
            info!(slot = slot.get(), task = %task, "worker terminated");
        }
    }

    fn maybe_report(&mut self) {
        if self.clock.nanos_since(self.last_report) >= self.config.report_interval_ns {
            self.report();
        }
    }

    fn report(&mut self) {
        self.last_report = self.clock;
        let Some(out) = self.report_out.as_mut() else {
            return;
        };
        let snapshot = self.table.snapshot();
        let report = StatusReport {
            pid: self.pid,
            clock: self.clock,
            slots: &snapshot,
        };
        if let Err(e) = write!(out, "{report}").and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write status report");
        }
    }
}
