//! Fixed-window rate limiting.
//!
//! Counters live behind [`CounterStore`]; the bundled [`MemoryCounterStore`]
//! keeps them in process, so quotas are enforced per gateway instance.

pub mod clock;
pub mod errors;
pub mod interval;
pub mod key;
pub mod limiter;
pub mod prelude;
pub mod store;

pub use errors::RateLimitError;
pub use interval::Interval;
pub use key::RateLimitKey;
pub use limiter::{Decision, RateLimiter};
pub use store::{CounterSnapshot, CounterStore, MemoryCounterStore};
