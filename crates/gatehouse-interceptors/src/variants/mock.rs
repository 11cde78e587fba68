use super::{mismatch, parse_json, Interceptor};
use crate::errors::InterceptError;
use crate::kind::{ExecutionPoint, InterceptorKind};
use crate::params::ParameterBag;
use crate::policy::{MockPolicy, Policy};
use crate::spec::InterceptorSpec;

pub const TEMPLATE_MOCK: &str = "mock.mustache";

#[derive(Clone, Copy, Debug, Default)]
pub struct MockInterceptor;

impl Interceptor for MockInterceptor {
    fn kind(&self) -> InterceptorKind {
        InterceptorKind::Mock
    }

    fn template_file(&self, _point: ExecutionPoint) -> &'static str {
        TEMPLATE_MOCK
    }

    fn parse_content(&self, raw: &str, _point: ExecutionPoint) -> Result<Policy, InterceptError> {
        let policy: MockPolicy = parse_json(raw, self.kind(), TEMPLATE_MOCK)?;
        if http::StatusCode::from_u16(policy.status).is_err() {
            return Err(InterceptError::invalid_content(
                self.kind(),
                TEMPLATE_MOCK,
                format!("{} is not an HTTP status", policy.status),
            ));
        }
        Ok(Policy::Mock(policy))
    }

    fn build_parameters(
        &self,
        policy: &Policy,
        mut params: ParameterBag,
        _spec: &InterceptorSpec,
    ) -> Result<ParameterBag, InterceptError> {
        let Policy::Mock(policy) = policy else {
            return Err(mismatch(self.kind(), TEMPLATE_MOCK, policy));
        };
        params.insert("status", policy.status);
        params.insert("body", policy.body.clone());
        Ok(params)
    }
}
