//! Gateway-level errors.
//!
//! Every failure ends up as an [`ErrorObj`] from `gatehouse-errors`, so the
//! HTTP status and the public body come from the code registry.

use gatehouse_errors::prelude::*;
use gatehouse_interceptors::InterceptError;
use gatehouse_ratelimit::RateLimitError;
use gatehouse_trace::TraceError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct GatewayError(pub Box<ErrorObj>);

impl GatewayError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self(Box::new(ErrorBuilder::new(code).user_msg(message).build()))
    }

    pub fn config_invalid(details: impl Into<String>) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::CONFIG_INVALID)
                .dev_msg(details)
                .build(),
        ))
    }

    pub fn upstream_timeout(timeout_ms: u64) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::UPSTREAM_TIMEOUT)
                .dev_msg(format!("upstream exceeded timeout of {timeout_ms}ms"))
                .build(),
        ))
    }

    pub fn upstream_unavailable(details: impl Into<String>) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::UPSTREAM_UNAVAILABLE)
                .dev_msg(details)
                .build(),
        ))
    }

    pub fn internal(message: &str) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .user_msg("An internal error occurred")
                .dev_msg(message)
                .build(),
        ))
    }

    pub fn with_correlation(mut self, id: impl Into<String>) -> Self {
        self.0.correlation_id = Some(id.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }

    pub fn user_message(&self) -> &str {
        &self.0.message_user
    }

    pub fn dev_message(&self) -> Option<&str> {
        self.0.message_dev.as_deref()
    }

    pub fn http_status(&self) -> u16 {
        self.0.http_status
    }

    pub fn is_retryable(&self) -> bool {
        self.0.is_transient()
    }

    pub fn inner(&self) -> &ErrorObj {
        &self.0
    }

    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }
}

impl From<ErrorObj> for GatewayError {
    fn from(err: ErrorObj) -> Self {
        Self(Box::new(err))
    }
}

impl From<InterceptError> for GatewayError {
    fn from(err: InterceptError) -> Self {
        Self(err.0)
    }
}

impl From<TraceError> for GatewayError {
    fn from(err: TraceError) -> Self {
        Self(err.0)
    }
}

impl From<RateLimitError> for GatewayError {
    fn from(err: RateLimitError) -> Self {
        Self(err.0)
    }
}

impl From<GatewayError> for InterceptError {
    fn from(err: GatewayError) -> Self {
        InterceptError(err.0)
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(&format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::config_invalid(err.to_string())
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_invalid(err.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_504_and_is_retryable() {
        let err = GatewayError::upstream_timeout(250);
        assert_eq!(err.code(), codes::UPSTREAM_TIMEOUT);
        assert_eq!(err.http_status(), 504);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn config_errors_are_permanent() {
        let err: GatewayError = serde_yaml::from_str::<u32>("not: [a number").unwrap_err().into();
        assert_eq!(err.code(), codes::CONFIG_INVALID);
        assert_eq!(err.http_status(), 500);
        assert!(!err.is_retryable());
    }
}
