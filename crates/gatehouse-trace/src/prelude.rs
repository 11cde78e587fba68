pub use crate::emit::{EmitReport, TraceEmitter, TRACE_MARK};
pub use crate::errors::TraceError;
pub use crate::holder::{SharedTrace, TraceBinding, TraceContextHolder, UnitId};
pub use crate::lifecycle::{flush_and_release, CallTrace, CLIENT_CLOSED_STATUS, PANICKED_STATUS};
pub use crate::model::{FilterDetail, FilterStatus, GeneralTrace, MessageRecord, StackTrace, Trace};
pub use crate::request::InboundCall;
pub use crate::settings::TraceSettings;
pub use crate::severity::LogTier;
pub use crate::sink::{memory::MemorySink, log::LogSink, SinkRecord, SinkTarget, TraceSink};
