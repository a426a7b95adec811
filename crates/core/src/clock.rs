//! Virtual clock value type and the single-writer / multi-reader seam.
//!
//! The clock is a `{seconds, nanoseconds}` pair with nanoseconds kept in
//! `[0, 1e9)`. It is carried across the shared boundary as a single `u64`
//! nanosecond count so that a reader can never observe a pair torn across a
//! carry into seconds.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds added to the clock per scheduler iteration.
pub const DEFAULT_QUANTUM_NS: u64 = 100_000;

/// A point in virtual time.
///
/// Field order matters: the derived `Ord` compares seconds first, then
/// nanoseconds, which is exactly the "has the deadline been reached" rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualClock {
    seconds: u64,
    nanoseconds: u32,
}

impl VirtualClock {
    pub const ZERO: VirtualClock = VirtualClock {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Build a clock value, carrying any nanosecond overflow into seconds.
    pub fn new(seconds: u64, nanoseconds: u64) -> Self {
        Self {
            seconds: seconds + nanoseconds / NANOS_PER_SEC,
            nanoseconds: (nanoseconds % NANOS_PER_SEC) as u32,
        }
    }

    pub fn from_nanos(total: u64) -> Self {
        Self::new(0, total)
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Total nanoseconds since the clock was zeroed.
    pub fn as_nanos(&self) -> u64 {
        self.seconds * NANOS_PER_SEC + u64::from(self.nanoseconds)
    }

    /// Move the clock forward by `quantum_ns`, normalizing the pair.
    pub fn advance(&mut self, quantum_ns: u64) {
        *self = self.add(0, quantum_ns);
    }

    /// Return this instant shifted forward by a `{seconds, nanoseconds}` span.
    pub fn add(&self, seconds: u64, nanoseconds: u64) -> Self {
        Self::new(
            self.seconds + seconds,
            u64::from(self.nanoseconds) + nanoseconds,
        )
    }

    /// Virtual nanoseconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn nanos_since(&self, earlier: VirtualClock) -> u64 {
        self.as_nanos().saturating_sub(earlier.as_nanos())
    }

    pub fn has_reached(&self, deadline: VirtualClock) -> bool {
        *self >= deadline
    }
}

impl fmt::Display for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s {}ns", self.seconds, self.nanoseconds)
    }
}

/// Read side of the shared clock. Every read returns a self-consistent pair.
pub trait ClockSource {
    fn now(&self) -> VirtualClock;
}

/// Write side of the shared clock. Only the scheduler holds one.
pub trait ClockSink {
    fn publish(&self, clock: VirtualClock);
}

impl<T: ClockSource + ?Sized> ClockSource for &T {
    fn now(&self) -> VirtualClock {
        (**self).now()
    }
}

impl<T: ClockSink + ?Sized> ClockSink for &T {
    fn publish(&self, clock: VirtualClock) {
        (**self).publish(clock)
    }
}

/// In-process shared clock. Cloned handles observe the same value.
#[derive(Debug, Clone, Default)]
pub struct LocalClock {
    nanos: Arc<AtomicU64>,
}

impl LocalClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockSource for LocalClock {
    fn now(&self) -> VirtualClock {
        VirtualClock::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

impl ClockSink for LocalClock {
    fn publish(&self, clock: VirtualClock) {
        self.nanos.store(clock.as_nanos(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_carries_overflow() {
        let c = VirtualClock::new(1, 2_500_000_000);
        assert_eq!(c.seconds(), 3);
        assert_eq!(c.nanoseconds(), 500_000_000);
    }

    #[test]
    fn advance_stays_normalized_and_monotonic() {
        let mut clock = VirtualClock::ZERO;
        let mut prev = clock;
        for _ in 0..25_000 {
            clock.advance(DEFAULT_QUANTUM_NS);
            assert!(u64::from(clock.nanoseconds()) < NANOS_PER_SEC);
            assert!(clock.seconds() >= prev.seconds());
            assert!(clock > prev);
            prev = clock;
        }
        assert_eq!(clock, VirtualClock::new(2, 500_000_000));
    }

    #[test]
    fn advance_with_odd_quantum_carries() {
        let mut clock = VirtualClock::new(0, 999_999_999);
        clock.advance(3);
        assert_eq!(clock, VirtualClock::new(1, 2));
    }

    #[test]
    fn deadline_arithmetic_carries() {
        let baseline = VirtualClock::new(10, 900_000_000);
        let deadline = baseline.add(2, 200_000_000);
        assert_eq!(deadline.seconds(), 13);
        assert_eq!(deadline.nanoseconds(), 100_000_000);
    }

    #[test]
    fn has_reached_compares_seconds_then_nanos() {
        let deadline = VirtualClock::new(5, 500);
        assert!(!VirtualClock::new(4, 999_999_999).has_reached(deadline));
        assert!(!VirtualClock::new(5, 499).has_reached(deadline));
        assert!(VirtualClock::new(5, 500).has_reached(deadline));
        assert!(VirtualClock::new(6, 0).has_reached(deadline));
    }

    #[test]
    fn nanos_since_saturates() {
        let a = VirtualClock::new(1, 0);
        let b = VirtualClock::new(0, 500_000_000);
        assert_eq!(a.nanos_since(b), 500_000_000);
        assert_eq!(b.nanos_since(a), 0);
    }

    #[test]
    fn local_clock_handles_share_state() {
        let writer = LocalClock::new();
        let reader = writer.clone();
        assert_eq!(reader.now(), VirtualClock::ZERO);

        writer.publish(VirtualClock::new(7, 123));
        assert_eq!(reader.now(), VirtualClock::new(7, 123));
    }
}
