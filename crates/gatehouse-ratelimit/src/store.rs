use crate::errors::RateLimitError;
use crate::key::RateLimitKey;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Counter state observed right after an increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub window_start: Instant,
    pub count: u64,
    pub limit: u64,
    pub window_size: Duration,
}

impl CounterSnapshot {
    pub fn window_end(&self) -> Instant {
        self.window_start + self.window_size
    }
}

/// Backing storage for window counters.
///
/// `increment` must reset-if-expired and increment as one atomic step per
/// key. A store shared between gateway instances has to provide the same
/// guarantee at its own layer.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment(
        &self,
        key: &RateLimitKey,
        limit: u64,
        window_size: Duration,
        now: Instant,
    ) -> Result<CounterSnapshot, RateLimitError>;

    /// Drops counters whose window ended before `now`. Returns how many went.
    async fn purge_expired(&self, now: Instant) -> Result<usize, RateLimitError>;

    async fn peek(&self, key: &RateLimitKey) -> Result<Option<CounterSnapshot>, RateLimitError>;
}

#[derive(Clone, Copy, Debug)]
struct RateLimitCounter {
    window_start: Instant,
    count: u64,
    limit: u64,
    window_size: Duration,
}

impl RateLimitCounter {
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            window_start: self.window_start,
            count: self.count,
            limit: self.limit,
            window_size: self.window_size,
        }
    }
}

/// In-process counters. The DashMap entry guard holds the shard lock for the
/// whole reset/increment sequence.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: DashMap<RateLimitKey, RateLimitCounter>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(
        &self,
        key: &RateLimitKey,
        limit: u64,
        window_size: Duration,
        now: Instant,
    ) -> Result<CounterSnapshot, RateLimitError> {
        let mut entry = self
            .counters
            .entry(key.clone())
            .or_insert_with(|| RateLimitCounter {
                window_start: now,
                count: 0,
                limit,
                window_size,
            });

        // Only a forward move past the window end resets; an earlier `now`
        // leaves the window alone.
        let expired = now
            .checked_duration_since(entry.window_start)
            .is_some_and(|elapsed| elapsed >= entry.window_size);
        if expired {
            entry.window_start = now;
            entry.count = 0;
        }
        entry.limit = limit;
        entry.window_size = window_size;
        entry.count = entry.count.saturating_add(1);
        Ok(entry.snapshot())
    }

    async fn purge_expired(&self, now: Instant) -> Result<usize, RateLimitError> {
        let before = self.counters.len();
        self.counters.retain(|_, counter| {
            now.checked_duration_since(counter.window_start)
                .map_or(true, |elapsed| elapsed < counter.window_size)
        });
        Ok(before.saturating_sub(self.counters.len()))
    }

    async fn peek(&self, key: &RateLimitKey) -> Result<Option<CounterSnapshot>, RateLimitError> {
        Ok(self.counters.get(key).map(|counter| counter.snapshot()))
    }
}
