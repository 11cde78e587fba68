use gatehouse_errors::prelude::*;
use serde_json::json;

#[test]
fn build_and_render_public() {
    let err = ErrorBuilder::new(codes::INTERCEPTOR_INVALID_CONTENT)
        .dev_msg("invalid type: string \"abc\", expected u32")
        .meta_kv("interceptor_kind", json!("RATTING"))
        .meta_kv("template", json!("ratting.mustache"))
        .meta_kv("api_id", json!("10"))
        .correlation("req-123")
        .build();

    assert_eq!(err.http_status, 422);
    assert_eq!(err.kind, ErrorKind::InvalidContent);

    let public_view = err.to_public();
    assert_eq!(public_view.code, "INTERCEPTOR.INVALID_CONTENT");
    assert_eq!(public_view.message, "Interceptor content is invalid.");
    assert_eq!(public_view.details.get("interceptor_kind"), Some(&json!("RATTING")));
    assert!(public_view.details.get("api_id").is_none());
    assert_eq!(public_view.correlation_id.as_deref(), Some("req-123"));
}

#[test]
fn rate_limit_code_is_transient_429_with_retry_hint() {
    let err = ErrorBuilder::new(codes::QUOTA_RATELIMIT).retry_after(40).build();
    assert_eq!(err.http_status, 429);
    assert!(err.is_transient());
    assert_eq!(err.retry_after_secs(), Some(40));
    assert_eq!(err.message_user, "Too many requests. Please retry later.");
    assert_eq!(err.to_public().details.get(RETRY_AFTER_SECS), Some(&json!(40)));
}

#[test]
fn audit_view_keeps_operator_detail() {
    let err = ErrorBuilder::new(codes::UPSTREAM_TIMEOUT)
        .dev_msg("upstream exceeded 50ms")
        .meta_kv("api_id", json!("orders"))
        .build();
    let audit = err.to_audit();
    assert_eq!(audit.kind, "Timeout");
    assert_eq!(audit.retryable, "transient");
    assert_eq!(audit.message_dev.as_deref(), Some("upstream exceeded 50ms"));
    assert_eq!(audit.meta.get("api_id"), Some(&json!("orders")));
}

#[test]
fn error_obj_survives_json() {
    let err = ErrorBuilder::new(codes::UPSTREAM_TIMEOUT).build();
    let text = serde_json::to_string(&err).unwrap();
    let back: ErrorObj = serde_json::from_str(&text).unwrap();
    assert_eq!(back.code, codes::UPSTREAM_TIMEOUT);
    assert_eq!(back.http_status, 504);
}

#[test]
fn unregistered_codes_read_back_as_internal() {
    for raw in ["\"NOT.A.CODE\"", "\"quota.rate_limited\"", "\"\""] {
        let code: ErrorCode = serde_json::from_str(raw).unwrap();
        assert_eq!(code, codes::UNKNOWN_INTERNAL, "{raw}");
    }
    let known: ErrorCode = serde_json::from_str("\"QUOTA.RATE_LIMITED\"").unwrap();
    assert_eq!(known, codes::QUOTA_RATELIMIT);
}
