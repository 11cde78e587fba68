use super::{SinkRecord, SinkTarget, TraceSink};
use crate::emit::TRACE_MARK;
use crate::errors::TraceError;
use crate::severity::LogTier;

macro_rules! log_at {
    ($tier:expr, $target:literal, $($rest:tt)+) => {
        match $tier {
            LogTier::Info => tracing::info!(target: $target, $($rest)+),
            LogTier::Warn => tracing::warn!(target: $target, $($rest)+),
            LogTier::Error => tracing::error!(target: $target, $($rest)+),
        }
    };
}

/// Sink backed by `tracing` events. Each target maps to its own event target
/// (`gatehouse::trace`, `mongo`, `logstash`) so subscribers can route them.
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    target: SinkTarget,
}

impl LogSink {
    pub fn new(target: SinkTarget) -> Self {
        Self { target }
    }

    pub fn primary() -> Self {
        Self::new(SinkTarget::Primary)
    }

    pub fn mongo() -> Self {
        Self::new(SinkTarget::Mongo)
    }

    pub fn logstash() -> Self {
        Self::new(SinkTarget::Logstash)
    }
}

impl TraceSink for LogSink {
    fn target(&self) -> SinkTarget {
        self.target
    }

    fn write(&self, tier: LogTier, record: &SinkRecord) -> Result<(), TraceError> {
        match (self.target, record) {
            (SinkTarget::Primary, SinkRecord::Dump(json)) => {
                log_at!(tier, "gatehouse::trace", "{}{} ", TRACE_MARK, json)
            }
            (SinkTarget::Primary, SinkRecord::Summary { line, call }) => {
                log_at!(
                    tier,
                    "gatehouse::trace",
                    call = call.as_deref().unwrap_or_default(),
                    "{}",
                    line
                )
            }
            (SinkTarget::Mongo, record) => log_at!(tier, "mongo", "{}", record.body()),
            (SinkTarget::Logstash, record) => log_at!(tier, "logstash", "{}", record.body()),
        }
        Ok(())
    }
}
