//! Bounded pool of execution units.
//!
//! A call leases one unit for its whole lifetime; the unit id is what the
//! trace holder keys bindings on. Units go back to the free list when the
//! lease drops, so ids are reused across calls.

use gatehouse_trace::UnitId;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

use crate::errors::{GatewayError, GatewayResult};

#[derive(Debug)]
struct PoolInner {
    permits: Arc<Semaphore>,
    free: Mutex<Vec<UnitId>>,
    size: usize,
}

#[derive(Clone, Debug)]
pub struct ExecutionPool {
    inner: Arc<PoolInner>,
}

/// One leased execution unit. Returned to the pool on drop.
#[derive(Debug)]
pub struct UnitLease {
    unit: UnitId,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl ExecutionPool {
    pub fn new(size: usize) -> GatewayResult<Self> {
        if size == 0 {
            return Err(GatewayError::config_invalid("execution pool needs at least one unit"));
        }
        // Reversed so that unit-0 is handed out first.
        let free = (0..size).rev().map(UnitId).collect();
        Ok(Self {
            inner: Arc::new(PoolInner {
                permits: Arc::new(Semaphore::new(size)),
                free: Mutex::new(free),
                size,
            }),
        })
    }

    pub fn size(&self) -> usize {
        self.inner.size
    }

    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Waits for a free unit.
    pub async fn acquire(&self) -> GatewayResult<UnitLease> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| GatewayError::internal("execution pool closed"))?;
        let unit = self
            .inner
            .free
            .lock()
            .pop()
            .ok_or_else(|| GatewayError::internal("execution pool free list exhausted"))?;
        Ok(UnitLease {
            unit,
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }
}

impl UnitLease {
    pub fn unit(&self) -> UnitId {
        self.unit
    }
}

impl Drop for UnitLease {
    fn drop(&mut self) {
        let mut free = self.pool.free.lock();
        if free.contains(&self.unit) {
            warn!(unit = %self.unit, "execution unit returned twice");
            return;
        }
        // Pushed before the permit field drops, so a woken waiter finds it.
        free.push(self.unit);
    }
}
