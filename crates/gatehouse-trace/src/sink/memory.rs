use super::{SinkRecord, SinkTarget, TraceSink};
use crate::errors::TraceError;
use crate::severity::LogTier;
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every record in memory. Optionally refuses all writes, to exercise
/// the failure path.
#[derive(Clone, Debug)]
pub struct MemorySink {
    target: SinkTarget,
    fail: bool,
    records: Arc<Mutex<Vec<(LogTier, SinkRecord)>>>,
}

impl MemorySink {
    pub fn new(target: SinkTarget) -> Self {
        Self {
            target,
            fail: false,
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(target: SinkTarget) -> Self {
        Self {
            fail: true,
            ..Self::new(target)
        }
    }

    pub fn records(&self) -> Vec<(LogTier, SinkRecord)> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl TraceSink for MemorySink {
    fn target(&self) -> SinkTarget {
        self.target
    }

    fn write(&self, tier: LogTier, record: &SinkRecord) -> Result<(), TraceError> {
        if self.fail {
            return Err(TraceError::sink_write(self.target.as_str(), "sink rejected write"));
        }
        self.records.lock().push((tier, record.clone()));
        Ok(())
    }
}
