//! Scheduler runner -- the virtual-clock admission/reclaim loop.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, builder options, and accessors
//! - `execution`: the per-iteration step, the main loop, and the watchdog kill
//! - `scheduling`: reaping finished workers and admitting new ones

mod core;
mod execution;
mod scheduling;

pub use self::core::Scheduler;
