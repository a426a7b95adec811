//! Human-readable status table printed by the scheduler.

use std::fmt;

use oss_core::VirtualClock;

use crate::pcb::Pcb;

pub struct StatusReport<'a> {
    pub pid: u32,
    pub clock: VirtualClock,
    pub slots: &'a [Pcb],
}

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OSS PID:{} SysClockS: {} SysclockNano: {}",
            self.pid,
            self.clock.seconds(),
            self.clock.nanoseconds()
        )?;
        writeln!(f, "Process Table:")?;
        writeln!(f, "{:<6}{:<9}{:<8}{:<7}{}", "Entry", "Occupied", "PID", "StartS", "StartN")?;
        for (i, pcb) in self.slots.iter().enumerate() {
            let pid = pcb.task_id().map_or(0, |t| t.0);
            writeln!(
                f,
                "{:<6}{:<9}{:<8}{:<7}{}",
                i,
                u8::from(pcb.is_occupied()),
                pid,
                pcb.start().seconds(),
                pcb.start().nanoseconds()
            )?;
        }
        Ok(())
    }
}
