use crate::clock::{Clock, MonotonicClock};
use crate::errors::RateLimitError;
use crate::key::RateLimitKey;
use crate::store::{CounterStore, MemoryCounterStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allowed { remaining: u64 },
    Denied { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    /// Whole seconds a denied caller should wait, rounded up and never zero.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::Denied { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCounterStore::new()), Arc::new(MonotonicClock))
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    pub async fn check(
        &self,
        key: &RateLimitKey,
        limit: u64,
        window_size: Duration,
    ) -> Result<Decision, RateLimitError> {
        if limit == 0 {
            return Err(RateLimitError::invalid_limit(limit));
        }
        if window_size.is_zero() {
            return Err(RateLimitError::invalid_window());
        }

        let now = self.clock.now();
        let snapshot = self.store.increment(key, limit, window_size, now).await?;

        if snapshot.count > limit {
            let retry_after = snapshot.window_end().saturating_duration_since(now);
            debug!(%key, count = snapshot.count, limit, ?retry_after, "rate limit exceeded");
            return Ok(Decision::Denied { retry_after });
        }

        Ok(Decision::Allowed {
            remaining: limit - snapshot.count,
        })
    }

    pub async fn purge_expired(&self) -> Result<usize, RateLimitError> {
        self.store.purge_expired(self.clock.now()).await
    }
}
