use crate::model::Trace;
use crate::severity::LogTier;
use crate::sink::log::LogSink;
use crate::sink::{SinkRecord, SinkTarget, TraceSink};
use std::sync::Arc;
use tracing::error;

pub const TRACE_MARK: &str = " [GATEHOUSE-TRACE] - ";

/// Which sinks took a record and which ones failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub tier: Option<LogTier>,
    pub written: Vec<SinkTarget>,
    pub failed: Vec<SinkTarget>,
}

/// Fans a finished trace out to the primary sink and, when the trace asks for
/// it, to the mongo and logstash sinks.
#[derive(Clone)]
pub struct TraceEmitter {
    primary: Arc<dyn TraceSink>,
    mongo: Option<Arc<dyn TraceSink>>,
    logstash: Option<Arc<dyn TraceSink>>,
}

impl TraceEmitter {
    pub fn new(primary: Arc<dyn TraceSink>) -> Self {
        Self {
            primary,
            mongo: None,
            logstash: None,
        }
    }

    /// Primary, mongo and logstash sinks all routed through `tracing`.
    pub fn logging() -> Self {
        Self::new(Arc::new(LogSink::primary()))
            .with_mongo(Arc::new(LogSink::mongo()))
            .with_logstash(Arc::new(LogSink::logstash()))
    }

    pub fn with_mongo(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.mongo = Some(sink);
        self
    }

    pub fn with_logstash(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.logstash = Some(sink);
        self
    }

    /// Writes `trace` at the tier derived from its result status. Failures are
    /// logged and reported, never returned.
    pub fn emit(&self, trace: &Trace) -> EmitReport {
        let tier = LogTier::from_status(trace.result_status().unwrap_or_default());
        let mut report = EmitReport {
            tier: Some(tier),
            ..EmitReport::default()
        };

        let dump = match serde_json::to_string(trace) {
            Ok(json) => Some(json),
            Err(err) => {
                error!(url = %trace.url, error = %err, "failed to serialize trace");
                None
            }
        };

        let primary_record = if trace.print_all_trace() {
            dump.clone().map(SinkRecord::Dump)
        } else {
            Some(SinkRecord::Summary {
                line: format!("{}{}", TRACE_MARK, trace.url),
                call: dump.clone(),
            })
        };
        match primary_record {
            Some(record) => write_one(self.primary.as_ref(), tier, &record, &mut report),
            None => report.failed.push(self.primary.target()),
        }

        let secondaries = [
            (trace.print_mongo(), self.mongo.as_ref()),
            (trace.print_logstash(), self.logstash.as_ref()),
        ];
        for (enabled, sink) in secondaries {
            let Some(sink) = sink.filter(|_| enabled) else {
                continue;
            };
            match &dump {
                Some(json) => write_one(
                    sink.as_ref(),
                    tier,
                    &SinkRecord::Dump(json.clone()),
                    &mut report,
                ),
                None => report.failed.push(sink.target()),
            }
        }

        report
    }
}

fn write_one(sink: &dyn TraceSink, tier: LogTier, record: &SinkRecord, report: &mut EmitReport) {
    match sink.write(tier, record) {
        Ok(()) => report.written.push(sink.target()),
        Err(err) => {
            error!(
                sink = sink.target().as_str(),
                error = ?err.0.message_dev,
                "trace sink write failed"
            );
            report.failed.push(sink.target());
        }
    }
}
