use crate::kind::InterceptorKind;
use gatehouse_errors::prelude::*;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct InterceptError(pub Box<ErrorObj>);

impl InterceptError {
    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }

    /// Declarative content of an interceptor could not be turned into a
    /// policy. Names the interceptor kind and its template.
    pub fn invalid_content(kind: InterceptorKind, template: &str, dev: impl Into<String>) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::INTERCEPTOR_INVALID_CONTENT)
                .user_msg(format!(
                    "Content of interceptor {} (template {template}) is invalid.",
                    kind.as_str()
                ))
                .dev_msg(dev)
                .meta_kv("interceptor_kind", json!(kind.as_str()))
                .meta_kv("template", json!(template))
                .build(),
        ))
    }

    pub fn unknown_kind(kind: &str) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::INTERCEPTOR_UNKNOWN_KIND)
                .dev_msg(format!("no interceptor registered for kind {kind}"))
                .meta_kv("interceptor_kind", json!(kind))
                .build(),
        ))
    }

    /// Template parameters cannot be rendered into a check.
    pub fn render(template: &str, msg: impl Into<String>) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::CONFIG_INVALID)
                .dev_msg(msg)
                .meta_kv("template", json!(template))
                .build(),
        ))
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::QUOTA_RATELIMIT)
                .retry_after(retry_after_secs)
                .build(),
        ))
    }

    pub fn deny_policy(reason: &str) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::POLICY_DENY)
                .dev_msg(reason)
                .build(),
        ))
    }

    /// Tags the error with the interceptor kind and template it came from,
    /// keeping any tags already present.
    pub fn for_interceptor(mut self, kind: InterceptorKind, template: &str) -> Self {
        let meta = &mut self.0.meta;
        meta.entry("interceptor_kind")
            .or_insert_with(|| json!(kind.as_str()));
        meta.entry("template").or_insert_with(|| json!(template));
        self
    }

    pub fn from_error(err: ErrorObj) -> Self {
        Self(Box::new(err))
    }

    pub fn internal(msg: &str) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .dev_msg(msg)
                .build(),
        ))
    }
}

impl From<ErrorObj> for InterceptError {
    fn from(value: ErrorObj) -> Self {
        Self(Box::new(value))
    }
}

impl From<gatehouse_ratelimit::RateLimitError> for InterceptError {
    fn from(value: gatehouse_ratelimit::RateLimitError) -> Self {
        Self(value.0)
    }
}

impl From<gatehouse_trace::TraceError> for InterceptError {
    fn from(value: gatehouse_trace::TraceError) -> Self {
        Self(value.0)
    }
}

/// Status and public JSON body for an error. Retry hints travel in
/// `details`; `retry_after_secs` is also lifted to the top level.
pub fn to_http_response(err: &InterceptError) -> (u16, serde_json::Value) {
    let obj = &err.0;
    let public = obj.to_public();
    let mut body = json!({
        "code": public.code,
        "message": public.message,
    });
    if !public.details.is_empty() {
        body["details"] = serde_json::Value::Object(public.details.clone());
    }
    if let Some(secs) = obj.retry_after_secs() {
        body[RETRY_AFTER_SECS] = json!(secs);
    }
    if let Some(id) = public.correlation_id {
        body["correlation_id"] = json!(id);
    }
    (obj.http_status, body)
}
