pub use crate::dispatch::{CallScope, DispatchOutcome, Dispatcher};
pub use crate::errors::{to_http_response, InterceptError};
pub use crate::kind::{ExecutionPoint, InterceptorKind};
pub use crate::params::ParameterBag;
pub use crate::policy::{IpListPolicy, LogPolicy, MockPolicy, Policy, RateLimitPolicy};
pub use crate::registry::{InterceptorRegistry, Prepared};
pub use crate::render::{CallView, NativeRenderer, PolicyCheck, TemplateRenderer, Verdict};
pub use crate::response::GatewayResponse;
pub use crate::spec::InterceptorSpec;
pub use crate::variants::Interceptor;
