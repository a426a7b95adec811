use oss_core::VirtualClock;

/// Scheduler loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Still launching workers.
    Running,
    /// Quota reached, waiting for in-flight workers to finish.
    Draining,
    /// Every worker launched and reaped.
    Terminated,
    /// The real-time watchdog fired and outstanding workers were killed.
    WatchdogKill,
}

impl SchedulerState {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Terminated | Self::WatchdogKill)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    WatchdogKill,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::WatchdogKill => 1,
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub ticks: u64,
    pub launched: u32,
    pub reaped: u32,
    pub killed: u32,
    pub final_clock: VirtualClock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_states() {
        assert!(!SchedulerState::Running.is_final());
        assert!(!SchedulerState::Draining.is_final());
        assert!(SchedulerState::Terminated.is_final());
        assert!(SchedulerState::WatchdogKill.is_final());
    }

    #[test]
    fn watchdog_exit_code_is_nonzero() {
        assert_eq!(RunOutcome::Completed.exit_code(), 0);
        assert_ne!(RunOutcome::WatchdogKill.exit_code(), 0);
    }
}
