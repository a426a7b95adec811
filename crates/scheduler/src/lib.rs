//! Virtual-clock process scheduler.
//!
//! The [`Scheduler`] advances a virtual clock once per loop iteration,
//! reaps finished workers, and launches new ones subject to a task quota, a
//! concurrency ceiling and a minimum launch interval. A real-time
//! [`Watchdog`] bounds the whole run.

pub mod admission;
pub mod pcb;
pub mod report;
pub mod runner;
pub mod spawner;
pub mod types;
pub mod watchdog;

pub use admission::{Admission, AdmissionCounters, AdmissionPolicy, DenyReason};
pub use pcb::{Pcb, PcbTable, SlotIndex, TaskId, PCB_CAPACITY};
pub use report::StatusReport;
pub use runner::Scheduler;
pub use spawner::{ProcessSpawner, TaskSpawner};
pub use types::{RunOutcome, RunSummary, SchedulerState};
pub use watchdog::Watchdog;
