use crate::errors::TraceError;
use crate::model::Trace;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::warn;

/// A trace owned by the call that created it.
pub type SharedTrace = Arc<Mutex<Trace>>;

/// Identifier of a pooled execution unit (worker slot).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Maps each execution unit to the trace of the call it is running.
///
/// The holder only keeps weak references; the call path owns the trace.
/// Bindings are handed out as [`TraceBinding`] guards and vanish when the
/// guard drops.
#[derive(Debug, Default)]
pub struct TraceContextHolder {
    bindings: DashMap<UnitId, Weak<Mutex<Trace>>>,
}

impl TraceContextHolder {
    pub fn new() -> Self {
        Self {
            bindings: DashMap::new(),
        }
    }

    /// Binds `trace` to `unit`.
    ///
    /// Fails if the unit still carries a live trace. A binding whose trace
    /// was already dropped is stale and gets replaced.
    pub fn bind(
        self: &Arc<Self>,
        unit: UnitId,
        trace: &SharedTrace,
    ) -> Result<TraceBinding, TraceError> {
        match self.bindings.entry(unit) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().strong_count() > 0 {
                    return Err(TraceError::already_bound(unit));
                }
                warn!(%unit, "replacing stale trace binding");
                occupied.insert(Arc::downgrade(trace));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::downgrade(trace));
            }
        }
        Ok(TraceBinding {
            holder: Arc::clone(self),
            unit,
            trace: Arc::downgrade(trace),
        })
    }

    pub fn current(&self, unit: UnitId) -> Result<SharedTrace, TraceError> {
        self.bindings
            .get(&unit)
            .and_then(|weak| weak.upgrade())
            .ok_or_else(|| TraceError::context_missing(unit))
    }

    /// Runs `f` against the trace bound to `unit`.
    pub fn with_current<R>(
        &self,
        unit: UnitId,
        f: impl FnOnce(&mut Trace) -> R,
    ) -> Result<R, TraceError> {
        let trace = self.current(unit)?;
        let mut guard = trace.lock();
        Ok(f(&mut guard))
    }

    /// Removes the binding for `unit`. Returns whether one existed.
    pub fn clear(&self, unit: UnitId) -> bool {
        self.bindings.remove(&unit).is_some()
    }

    fn release(&self, unit: UnitId, trace: &Weak<Mutex<Trace>>) -> bool {
        self.bindings
            .remove_if(&unit, |_, bound| Weak::ptr_eq(bound, trace))
            .is_some()
    }

    pub fn is_bound(&self, unit: UnitId) -> bool {
        self.bindings.contains_key(&unit)
    }

    pub fn bound_units(&self) -> usize {
        self.bindings.len()
    }
}

/// Live binding of a trace to an execution unit. Dropping it clears the
/// binding, including on early return and unwinding.
#[must_use = "the binding is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct TraceBinding {
    holder: Arc<TraceContextHolder>,
    unit: UnitId,
    trace: Weak<Mutex<Trace>>,
}

impl TraceBinding {
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn holder(&self) -> &Arc<TraceContextHolder> {
        &self.holder
    }
}

impl Drop for TraceBinding {
    fn drop(&mut self) {
        // Only our own binding goes; a unit rebound after a stale takeover
        // keeps its new trace.
        if !self.holder.release(self.unit, &self.trace) {
            warn!(unit = %self.unit, "trace binding was already cleared");
        }
    }
}
