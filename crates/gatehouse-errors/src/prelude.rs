pub use crate::{
    code::{codes, spec_of, CodeSpec, ErrorCode, REGISTRY},
    kind::ErrorKind,
    model::{ErrorBuilder, ErrorObj, RETRY_AFTER_SECS},
    render::{AuditErrorView, PublicErrorView},
    retry::RetryClass,
};
