use crate::clock::{VirtualClock, NANOS_PER_SEC};
use crate::error::{OssError, Result};

/// Randomized run duration handed to a worker at spawn time.
///
/// This is a span, not an absolute deadline: the worker adds it to the clock
/// value it reads when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerLifetime {
    pub seconds: u64,
    pub nanoseconds: u32,
}

impl WorkerLifetime {
    pub fn new(seconds: u64, nanoseconds: u32) -> Result<Self> {
        if u64::from(nanoseconds) >= NANOS_PER_SEC {
            return Err(OssError::Config(format!(
                "lifetime nanoseconds must be below {NANOS_PER_SEC}, got {nanoseconds}"
            )));
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    /// Absolute deadline for a worker whose first clock read was `baseline`.
    pub fn deadline_from(&self, baseline: VirtualClock) -> VirtualClock {
        baseline.add(self.seconds, u64::from(self.nanoseconds))
    }

    /// The two positional spawn arguments: seconds, then nanoseconds.
    pub fn to_args(&self) -> [String; 2] {
        [self.seconds.to_string(), self.nanoseconds.to_string()]
    }
}
