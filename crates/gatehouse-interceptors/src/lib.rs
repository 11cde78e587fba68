//! Policy interceptors for the gateway.
//!
//! Every interceptor kind knows three things: which template renders it,
//! how to parse its declarative content, and how to turn the parsed policy
//! into template parameters. The [`Dispatcher`] runs the configured
//! interceptors of an operation in order and records each outcome in the
//! call's trace.

pub mod dispatch;
pub mod errors;
pub mod kind;
pub mod params;
pub mod policy;
pub mod prelude;
pub mod registry;
pub mod render;
pub mod response;
pub mod spec;
pub mod variants;

pub use dispatch::{CallScope, DispatchOutcome, Dispatcher};
pub use errors::InterceptError;
pub use kind::{ExecutionPoint, InterceptorKind};
pub use params::ParameterBag;
pub use registry::{InterceptorRegistry, Prepared};
pub use render::{CallView, NativeRenderer, PolicyCheck, TemplateRenderer, Verdict};
pub use response::GatewayResponse;
pub use spec::InterceptorSpec;
pub use variants::Interceptor;
