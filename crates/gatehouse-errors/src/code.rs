use crate::{kind::ErrorKind, retry::RetryClass};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub &'static str);

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Codes outside the registry come back as `UNKNOWN.INTERNAL`.
impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match REGISTRY.get_key_value(s.as_str()) {
            Some((key, _)) => Ok(ErrorCode(key)),
            None => Ok(codes::UNKNOWN_INTERNAL),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CodeSpec {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub http_status: u16,
    pub retryable: RetryClass,
    pub default_user_msg: &'static str,
}

pub mod codes {
    use super::ErrorCode;

    pub const INTERCEPTOR_INVALID_CONTENT: ErrorCode = ErrorCode("INTERCEPTOR.INVALID_CONTENT");
    pub const INTERCEPTOR_UNKNOWN_KIND: ErrorCode = ErrorCode("INTERCEPTOR.UNKNOWN_KIND");
    pub const REQUEST_CONTEXT_MISSING: ErrorCode = ErrorCode("REQUEST.CONTEXT_MISSING");
    pub const QUOTA_RATELIMIT: ErrorCode = ErrorCode("QUOTA.RATE_LIMITED");
    pub const POLICY_DENY: ErrorCode = ErrorCode("POLICY.DENY");
    pub const SINK_WRITE_FAILED: ErrorCode = ErrorCode("OBSERVE.SINK_WRITE_FAILED");
    pub const UPSTREAM_TIMEOUT: ErrorCode = ErrorCode("UPSTREAM.TIMEOUT");
    pub const UPSTREAM_UNAVAILABLE: ErrorCode = ErrorCode("UPSTREAM.UNAVAILABLE");
    pub const CONFIG_INVALID: ErrorCode = ErrorCode("CONFIG.INVALID");
    pub const UNKNOWN_INTERNAL: ErrorCode = ErrorCode("UNKNOWN.INTERNAL");
}

pub static REGISTRY: Lazy<HashMap<&'static str, CodeSpec>> = Lazy::new(|| {
    use codes::*;

    let mut map = HashMap::new();
    let mut add = |spec: CodeSpec| {
        let key = spec.code.0;
        if map.insert(key, spec).is_some() {
            panic!("duplicate error code: {}", key);
        }
    };

    add(CodeSpec {
        code: INTERCEPTOR_INVALID_CONTENT,
        kind: ErrorKind::InvalidContent,
        http_status: 422,
        retryable: RetryClass::Permanent,
        default_user_msg: "Interceptor content is invalid.",
    });

    add(CodeSpec {
        code: INTERCEPTOR_UNKNOWN_KIND,
        kind: ErrorKind::UnknownInterceptor,
        http_status: 500,
        retryable: RetryClass::Permanent,
        default_user_msg: "Interceptor type is not supported.",
    });

    add(CodeSpec {
        code: REQUEST_CONTEXT_MISSING,
        kind: ErrorKind::ContextMissing,
        http_status: 500,
        retryable: RetryClass::Permanent,
        default_user_msg: "Request not found in the current context.",
    });

    add(CodeSpec {
        code: QUOTA_RATELIMIT,
        kind: ErrorKind::RateLimit,
        http_status: 429,
        retryable: RetryClass::Transient,
        default_user_msg: "Too many requests. Please retry later.",
    });

    add(CodeSpec {
        code: POLICY_DENY,
        kind: ErrorKind::PolicyDeny,
        http_status: 403,
        retryable: RetryClass::Permanent,
        default_user_msg: "Request denied by gateway policy.",
    });

    add(CodeSpec {
        code: SINK_WRITE_FAILED,
        kind: ErrorKind::Observe,
        http_status: 500,
        retryable: RetryClass::None,
        default_user_msg: "Trace sink write failed.",
    });

    add(CodeSpec {
        code: UPSTREAM_TIMEOUT,
        kind: ErrorKind::Timeout,
        http_status: 504,
        retryable: RetryClass::Transient,
        default_user_msg: "Upstream service did not respond in time.",
    });

    add(CodeSpec {
        code: UPSTREAM_UNAVAILABLE,
        kind: ErrorKind::Upstream,
        http_status: 502,
        retryable: RetryClass::Transient,
        default_user_msg: "Upstream service is unavailable. Please retry later.",
    });

    add(CodeSpec {
        code: CONFIG_INVALID,
        kind: ErrorKind::Config,
        http_status: 500,
        retryable: RetryClass::Permanent,
        default_user_msg: "Gateway configuration is invalid.",
    });

    add(CodeSpec {
        code: UNKNOWN_INTERNAL,
        kind: ErrorKind::Unknown,
        http_status: 500,
        retryable: RetryClass::Transient,
        default_user_msg: "Internal error. Please retry later.",
    });

    map
});

pub fn spec_of(code: ErrorCode) -> &'static CodeSpec {
    REGISTRY.get(code.0).expect("unregistered ErrorCode")
}
