//! Gatehouse: the request-processing core of an API gateway.
//!
//! Calls run through a [`pipeline::Gateway`]: policy interceptors before and
//! after the upstream, a per-call trace bound to the execution unit, and a
//! severity-classified flush of that trace to the configured sinks.

pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod pool;
pub mod upstream;

use once_cell::sync::Lazy;

pub use config::GatewayConfig;
pub use errors::{GatewayError, GatewayResult};
pub use pipeline::{Gateway, GatewayBuilder, GatewayReply};
pub use pool::{ExecutionPool, UnitLease};
pub use upstream::{StaticUpstream, Upstream};

static BUILD_VERSION: Lazy<String> =
    Lazy::new(|| format!("{}+{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")));

/// Package version plus the commit it was built from. Default trace version.
pub fn build_version() -> &'static str {
    BUILD_VERSION.as_str()
}
