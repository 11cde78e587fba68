use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for window arithmetic. Counters tolerate a source that steps
/// backwards but never reset because of it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used to drive window expiry in tests
/// and simulations without sleeping.
#[derive(Clone, Debug)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock();
        *guard += by;
    }

    /// Moves the clock back by `by`, as a misbehaving time source would.
    /// Saturates at the clock's starting point.
    pub fn rewind(&self, by: Duration) {
        let mut guard = self.current.lock();
        if let Some(earlier) = guard.checked_sub(by) {
            *guard = earlier;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}
