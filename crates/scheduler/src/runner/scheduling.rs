use oss_core::{ClockSink, Result};
use tracing::{info, warn};

use crate::admission::Admission;
use crate::spawner::TaskSpawner;

use super::Scheduler;

impl<S: TaskSpawner, C: ClockSink> Scheduler<S, C> {
    /// Release the slot of every worker whose exit is already observable.
    pub(super) fn reap_finished(&mut self) {
        for task in self.spawner.try_reap() {
            let Some(slot) = self.table.find_by_task(task) else {
                warn!(task = %task, "reaped a task with no PCB slot");
                continue;
            };
            self.table.release(slot);
            self.counters.record_exit();
            self.reaped += 1;
            info!(
                slot = slot.get(),
                task = %task,
                clock = %self.clock,
                running = self.counters.currently_running,
                "worker reaped"
            );
        }
    }

    /// Spawn one worker if the admission policy allows it this iteration.
    pub(super) fn admit(&mut self) -> Result<()> {
        let slot = match self.policy.evaluate(&self.counters, self.clock, &self.table) {
            Admission::Admit(slot) => slot,
            Admission::Deny(_) => return Ok(()),
        };

        let lifetime = self.policy.random_lifetime(&mut self.rng);
        let task = self.spawner.spawn(lifetime)?;
        self.table.occupy(slot, task, self.clock);
        self.counters.record_launch(self.clock);
        info!(
            slot = slot.get(),
            task = %task,
            clock = %self.clock,
            lifetime_s = lifetime.seconds,
            lifetime_ns = lifetime.nanoseconds,
            launched = self.counters.total_launched,
            running = self.counters.currently_running,
            "worker launched"
        );
        Ok(())
    }
}
