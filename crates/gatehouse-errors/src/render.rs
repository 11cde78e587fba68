use crate::{
    kind::ErrorKind,
    model::{ErrorObj, RETRY_AFTER_SECS},
    retry::RetryClass,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// What a caller of the gateway is allowed to see.
#[derive(Debug, Serialize)]
pub struct PublicErrorView {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Operator-facing rendering: everything except the user message, recorded
/// on traces of failed calls.
#[derive(Debug, Serialize)]
pub struct AuditErrorView {
    pub code: &'static str,
    pub kind: &'static str,
    pub http_status: u16,
    pub retryable: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_dev: Option<String>,
    pub meta: Map<String, Value>,
}

/// Meta keys that are safe to echo back to callers.
const PUBLIC_META: &[&str] = &["interceptor_kind", "template", RETRY_AFTER_SECS];

impl ErrorObj {
    pub fn to_public(&self) -> PublicErrorView {
        let details = self
            .meta
            .iter()
            .filter(|(key, _)| PUBLIC_META.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PublicErrorView {
            code: self.code.0,
            message: self.message_user.clone(),
            details,
            correlation_id: self.correlation_id.clone(),
        }
    }

    pub fn to_audit(&self) -> AuditErrorView {
        AuditErrorView {
            code: self.code.0,
            kind: ErrorKind::as_str(self.kind),
            http_status: self.http_status,
            retryable: RetryClass::as_str(self.retryable),
            message_dev: self.message_dev.clone(),
            meta: self.meta.clone(),
        }
    }
}
