use super::{mismatch, parse_json, Interceptor};
use crate::errors::InterceptError;
use crate::kind::{ExecutionPoint, InterceptorKind};
use crate::params::ParameterBag;
use crate::policy::{Policy, RateLimitPolicy};
use crate::spec::InterceptorSpec;
use tracing::error;

pub const TEMPLATE_RATTING: &str = "ratting.mustache";

#[derive(Clone, Copy, Debug, Default)]
pub struct RattingInterceptor;

impl Interceptor for RattingInterceptor {
    fn kind(&self) -> InterceptorKind {
        InterceptorKind::Ratting
    }

    fn template_file(&self, _point: ExecutionPoint) -> &'static str {
        TEMPLATE_RATTING
    }

    fn parse_content(&self, raw: &str, _point: ExecutionPoint) -> Result<Policy, InterceptError> {
        let policy: RateLimitPolicy = parse_json(raw, self.kind(), TEMPLATE_RATTING)?;
        if policy.calls == 0 {
            error!(raw, "rate limit content allows zero calls");
            return Err(InterceptError::invalid_content(
                self.kind(),
                TEMPLATE_RATTING,
                "calls must be >= 1",
            ));
        }
        Ok(Policy::Ratting(policy))
    }

    fn build_parameters(
        &self,
        policy: &Policy,
        mut params: ParameterBag,
        _spec: &InterceptorSpec,
    ) -> Result<ParameterBag, InterceptError> {
        let Policy::Ratting(policy) = policy else {
            return Err(mismatch(self.kind(), TEMPLATE_RATTING, policy));
        };
        params.insert("calls", policy.calls);
        params.insert("interval", policy.interval.name());
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_ratelimit::Interval;

    fn spec() -> InterceptorSpec {
        InterceptorSpec::new("i-1", "quota", InterceptorKind::Ratting, ExecutionPoint::Request, "")
    }

    #[test]
    fn parses_and_binds_symbolic_interval() {
        let policy = RattingInterceptor
            .parse_content(r#"{"calls": 5, "interval": "MINUTES"}"#, ExecutionPoint::Request)
            .unwrap();
        assert_eq!(
            policy,
            Policy::Ratting(RateLimitPolicy {
                calls: 5,
                interval: Interval::Minute
            })
        );

        let bag = RattingInterceptor
            .build_parameters(&policy, ParameterBag::new(), &spec())
            .unwrap();
        assert_eq!(bag.get_u64("calls"), Some(5));
        assert_eq!(bag.get_str("interval"), Some("MINUTE"));
    }

    #[test]
    fn rejects_zero_negative_and_unknown_fields() {
        for raw in [
            r#"{"calls": 0, "interval": "SECOND"}"#,
            r#"{"calls": -3, "interval": "SECOND"}"#,
            r#"{"calls": 3, "interval": "SECOND", "burst": 2}"#,
            r#"{"calls": 3}"#,
            "",
        ] {
            let err = RattingInterceptor
                .parse_content(raw, ExecutionPoint::Request)
                .unwrap_err();
            assert_eq!(err.code().0, "INTERCEPTOR.INVALID_CONTENT", "{raw}");
        }
    }
}
