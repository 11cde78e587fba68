//! Per-call trace records for the gateway.
//!
//! A [`Trace`] is created when a call enters, collects interceptor outcomes
//! and diagnostic messages while the call runs, and is flushed exactly once
//! through a [`TraceEmitter`] when the call leaves. [`TraceContextHolder`]
//! lets code that only knows its execution unit find the active trace.

pub mod emit;
pub mod errors;
pub mod holder;
pub mod lifecycle;
pub mod model;
pub mod prelude;
pub mod request;
pub mod settings;
pub mod severity;
pub mod sink;

pub use emit::{EmitReport, TraceEmitter};
pub use errors::TraceError;
pub use holder::{SharedTrace, TraceBinding, TraceContextHolder, UnitId};
pub use lifecycle::{flush_and_release, CallTrace};
pub use model::{FilterDetail, FilterStatus, GeneralTrace, MessageRecord, StackTrace, Trace};
pub use request::InboundCall;
pub use settings::TraceSettings;
pub use severity::LogTier;
