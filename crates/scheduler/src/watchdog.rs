use std::time::{Duration, Instant};

/// Real-time deadline for a whole scheduler run.
///
/// The loop polls [`Watchdog::expired`] once per iteration; expiry is a state
/// transition in the loop, not an asynchronous interrupt.
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    started: Instant,
    limit: Duration,
}

impl Watchdog {
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    pub fn expired(&self) -> bool {
        self.elapsed() >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_immediately_expired() {
        let dog = Watchdog::start(Duration::ZERO);
        assert!(dog.expired());
        assert_eq!(dog.remaining(), Duration::ZERO);
    }

    #[test]
    fn long_limit_is_not_expired() {
        let dog = Watchdog::start(Duration::from_secs(60));
        assert!(!dog.expired());
        assert!(dog.remaining() > Duration::from_secs(59));
    }

    #[test]
    fn expires_after_limit() {
        let dog = Watchdog::start(Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(30));
        assert!(dog.expired());
    }
}
