use crate::emit::{EmitReport, TraceEmitter};
use crate::holder::{SharedTrace, TraceBinding};
use tracing::{error, warn};

/// Status recorded when the caller went away before a response existed.
pub const CLIENT_CLOSED_STATUS: u16 = 499;
/// Status recorded when the call unwound from a panic.
pub const PANICKED_STATUS: u16 = 500;

/// Finalizes the call's trace with `status`, flushes it to the sinks and
/// releases the execution-unit binding.
///
/// The binding is released on every path out of this function. Returns
/// `None` when the trace had already been finalized.
pub fn flush_and_release(
    trace: &SharedTrace,
    status: u16,
    emitter: &TraceEmitter,
    binding: TraceBinding,
) -> Option<EmitReport> {
    let _binding = binding;
    let mut guard = trace.lock();
    if !guard.finalize(status) {
        warn!(
            url = %guard.url,
            status,
            previous = ?guard.result_status(),
            "trace already finalized; ignoring second flush"
        );
        return None;
    }
    let report = emitter.emit(&guard);
    if !report.failed.is_empty() {
        error!(url = %guard.url, failed = ?report.failed, "trace was not delivered to every sink");
    }
    Some(report)
}

/// Owns a call's trace, its sinks and its unit binding until the call ends.
///
/// [`CallTrace::finish`] is the normal exit. If the guard is dropped first,
/// because the caller's future was cancelled or the call panicked, the trace
/// is still finalized and flushed: with [`CLIENT_CLOSED_STATUS`] after a
/// cancellation, [`PANICKED_STATUS`] while unwinding.
#[must_use = "dropping the guard flushes the trace as abandoned"]
pub struct CallTrace {
    trace: SharedTrace,
    emitter: TraceEmitter,
    binding: Option<TraceBinding>,
}

impl CallTrace {
    pub fn new(trace: SharedTrace, emitter: TraceEmitter, binding: TraceBinding) -> Self {
        Self {
            trace,
            emitter,
            binding: Some(binding),
        }
    }

    pub fn trace(&self) -> &SharedTrace {
        &self.trace
    }

    pub fn finish(mut self, status: u16) -> Option<EmitReport> {
        let binding = self.binding.take()?;
        flush_and_release(&self.trace, status, &self.emitter, binding)
    }
}

impl Drop for CallTrace {
    fn drop(&mut self) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        let (status, reason) = if std::thread::panicking() {
            (PANICKED_STATUS, "call panicked before a response was produced")
        } else {
            (CLIENT_CLOSED_STATUS, "caller went away before a response was produced")
        };
        warn!(unit = %binding.unit(), status, "{reason}; flushing trace");
        self.trace.lock().trace(reason);
        flush_and_release(&self.trace, status, &self.emitter, binding);
    }
}
