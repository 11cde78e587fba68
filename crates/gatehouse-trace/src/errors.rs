use crate::holder::UnitId;
use gatehouse_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct TraceError(pub Box<ErrorObj>);

impl TraceError {
    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }

    pub fn context_missing(unit: UnitId) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::REQUEST_CONTEXT_MISSING)
                .dev_msg(format!("no trace bound to execution unit {unit}"))
                .build(),
        ))
    }

    pub fn already_bound(unit: UnitId) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .dev_msg(format!(
                    "execution unit {unit} already has an active trace bound"
                ))
                .build(),
        ))
    }

    pub fn sink_write(sink: &str, msg: &str) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::SINK_WRITE_FAILED)
                .dev_msg(format!("{sink}: {msg}"))
                .meta_kv("sink", serde_json::json!(sink))
                .build(),
        ))
    }
}

impl From<ErrorObj> for TraceError {
    fn from(value: ErrorObj) -> Self {
        Self(Box::new(value))
    }
}
