//! Worker lifecycle.
//!
//! A worker reads the shared clock once, derives its own deadline from the
//! lifetime it was spawned with, and then busy-polls the clock until the
//! deadline passes. Polling never sleeps: spinning on the clock is the
//! simulated "work".

use std::io::{self, Write};

use oss_core::{ClockSource, VirtualClock, WorkerLifetime};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Starting,
    Running,
    Terminating,
}

/// What a finished worker observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub started_at: VirtualClock,
    pub deadline: VirtualClock,
    pub finished_at: VirtualClock,
    /// Status lines written, including the start and end lines.
    pub lines: u64,
}

pub struct Worker<C: ClockSource> {
    clock: C,
    lifetime: WorkerLifetime,
    pid: u32,
    ppid: u32,
    phase: WorkerPhase,
}

impl<C: ClockSource> Worker<C> {
    pub fn new(clock: C, lifetime: WorkerLifetime) -> Self {
        Self {
            clock,
            lifetime,
            pid: std::process::id(),
            ppid: parent_pid(),
            phase: WorkerPhase::Starting,
        }
    }

    /// Override the ids printed in status lines.
    pub fn with_ids(mut self, pid: u32, ppid: u32) -> Self {
        self.pid = pid;
        self.ppid = ppid;
        self
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Run until the clock reaches this worker's deadline.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<WorkerSummary> {
        let started_at = self.clock.now();
        let deadline = self.lifetime.deadline_from(started_at);
        debug!(start = %started_at, deadline = %deadline, "worker starting");

        let mut lines = 0;
        self.status(out, started_at, deadline, "--Just Starting")?;
        lines += 1;

        self.enter(WorkerPhase::Running);
        let mut last_second = started_at.seconds();
        let finished_at = loop {
            let now = self.clock.now();
            if now.has_reached(deadline) {
                break now;
            }
            if now.seconds() != last_second {
                last_second = now.seconds();
                let elapsed = now.seconds() - started_at.seconds();
                self.status(
                    out,
                    now,
                    deadline,
                    &format!("--{elapsed} seconds have passed since starting"),
                )?;
                lines += 1;
            }
            std::hint::spin_loop();
        };

        self.enter(WorkerPhase::Terminating);
        self.status(out, finished_at, deadline, "--Terminating")?;
        lines += 1;
        out.flush()?;

        Ok(WorkerSummary {
            started_at,
            deadline,
            finished_at,
            lines,
        })
    }

    fn enter(&mut self, phase: WorkerPhase) {
        debug!(from = ?self.phase, to = ?phase, "worker phase");
        self.phase = phase;
    }

    fn status<W: Write>(
        &self,
        out: &mut W,
        now: VirtualClock,
        deadline: VirtualClock,
        note: &str,
    ) -> io::Result<()> {
        writeln!(
            out,
            "WORKER PID:{} PPID:{} SysClockS: {} SysclockNano: {} TermTimeS: {} TermTimeNano: {}",
            self.pid,
            self.ppid,
            now.seconds(),
            now.nanoseconds(),
            deadline.seconds(),
            deadline.nanoseconds()
        )?;
        writeln!(out, "{note}")
    }
}

#[cfg(unix)]
fn parent_pid() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn parent_pid() -> u32 {
    0
}
