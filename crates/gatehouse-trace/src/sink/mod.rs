use crate::errors::TraceError;
use crate::severity::LogTier;

pub mod log;
pub mod memory;

/// Where a sink writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SinkTarget {
    Primary,
    Mongo,
    Logstash,
}

impl SinkTarget {
    pub const fn as_str(self) -> &'static str {
        match self {
            SinkTarget::Primary => "primary",
            SinkTarget::Mongo => "mongo",
            SinkTarget::Logstash => "logstash",
        }
    }
}

/// A rendered trace, ready for a sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkRecord {
    /// Full JSON document of the trace.
    Dump(String),
    /// One-line summary plus the trace attached as a structured field.
    Summary { line: String, call: Option<String> },
}

impl SinkRecord {
    pub fn body(&self) -> &str {
        match self {
            SinkRecord::Dump(json) => json,
            SinkRecord::Summary { line, .. } => line,
        }
    }

    pub fn is_dump(&self) -> bool {
        matches!(self, SinkRecord::Dump(_))
    }
}

pub trait TraceSink: Send + Sync {
    fn target(&self) -> SinkTarget;

    fn write(&self, tier: LogTier, record: &SinkRecord) -> Result<(), TraceError>;
}
