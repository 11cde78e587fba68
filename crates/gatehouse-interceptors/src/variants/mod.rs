use crate::errors::InterceptError;
use crate::kind::{ExecutionPoint, InterceptorKind};
use crate::params::ParameterBag;
use crate::policy::Policy;
use crate::spec::InterceptorSpec;
use serde::de::DeserializeOwned;
use tracing::error;

pub mod ip_list;
pub mod log;
pub mod mock;
pub mod ratting;

pub use ip_list::{BlacklistInterceptor, WhitelistInterceptor};
pub use log::LogInterceptor;
pub use mock::MockInterceptor;
pub use ratting::RattingInterceptor;

/// One interceptor kind. Implementations hold no per-call state.
pub trait Interceptor: Send + Sync {
    fn kind(&self) -> InterceptorKind;

    /// Template that renders this interceptor at `point`.
    fn template_file(&self, point: ExecutionPoint) -> &'static str;

    /// Parses raw declarative content for an interceptor running at `point`.
    /// Fails with `INTERCEPTOR.INVALID_CONTENT` naming the template of that
    /// point; nothing is defaulted.
    fn parse_content(&self, raw: &str, point: ExecutionPoint) -> Result<Policy, InterceptError>;

    /// Adds the policy's parameters to `params` and hands the bag back.
    /// Binding the same policy twice yields the same bag.
    fn build_parameters(
        &self,
        policy: &Policy,
        params: ParameterBag,
        spec: &InterceptorSpec,
    ) -> Result<ParameterBag, InterceptError>;
}

/// Deserializes `raw` into `T`, logging the raw failure and mapping it to an
/// invalid-content error for `kind`/`template`.
pub(crate) fn parse_json<T: DeserializeOwned>(
    raw: &str,
    kind: InterceptorKind,
    template: &str,
) -> Result<T, InterceptError> {
    serde_json::from_str(raw).map_err(|err| {
        error!(kind = kind.as_str(), template, error = %err, "failed to parse interceptor content");
        InterceptError::invalid_content(kind, template, err.to_string())
    })
}

pub(crate) fn mismatch(kind: InterceptorKind, template: &str, policy: &Policy) -> InterceptError {
    InterceptError::invalid_content(
        kind,
        template,
        format!("{} interceptor cannot bind {policy:?}", kind.as_str()),
    )
}
