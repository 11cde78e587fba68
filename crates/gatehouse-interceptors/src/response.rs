use crate::errors::{to_http_response, InterceptError};
use serde::Serialize;
use serde_json::Value;

/// Response produced by the gateway itself rather than the upstream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Renders an error as a response. A retry hint on the error becomes a
    /// `Retry-After` header.
    pub fn from_error(err: &InterceptError) -> Self {
        let (status, body) = to_http_response(err);
        let retry_after = err.0.retry_after_secs();
        let response = Self::new(status, body);
        match retry_after {
            Some(secs) => response.with_header(http::header::RETRY_AFTER.as_str(), secs.to_string()),
            None => response,
        }
    }
}
