pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::errors::RateLimitError;
pub use crate::interval::Interval;
pub use crate::key::RateLimitKey;
pub use crate::limiter::{Decision, RateLimiter};
pub use crate::store::{CounterSnapshot, CounterStore, MemoryCounterStore};
