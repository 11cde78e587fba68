use gatehouse_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct RateLimitError(pub Box<ErrorObj>);

impl RateLimitError {
    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }

    pub fn invalid_limit(limit: u64) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::CONFIG_INVALID)
                .user_msg("Rate limit configuration is invalid.")
                .dev_msg(format!("limit must be >= 1, got {limit}"))
                .build(),
        ))
    }

    pub fn invalid_window() -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::CONFIG_INVALID)
                .user_msg("Rate limit configuration is invalid.")
                .dev_msg("window size must be non-zero")
                .build(),
        ))
    }

    pub fn store(msg: &str) -> Self {
        Self(Box::new(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .user_msg("Rate limit store unavailable.")
                .dev_msg(msg)
                .build(),
        ))
    }
}

impl From<ErrorObj> for RateLimitError {
    fn from(value: ErrorObj) -> Self {
        Self(Box::new(value))
    }
}
