pub mod clock;
pub mod config;
pub mod error;
pub mod lifetime;
pub mod shared;

pub use clock::{ClockSink, ClockSource, LocalClock, VirtualClock, DEFAULT_QUANTUM_NS, NANOS_PER_SEC};
pub use config::{load_dotenv, SchedulerConfig};
pub use error::*;
pub use lifetime::WorkerLifetime;
pub use shared::{ClockRegion, REGION_ENV};
