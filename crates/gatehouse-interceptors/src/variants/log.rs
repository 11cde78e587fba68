use super::{mismatch, parse_json, Interceptor};
use crate::errors::InterceptError;
use crate::kind::{ExecutionPoint, InterceptorKind};
use crate::params::ParameterBag;
use crate::policy::{LogPolicy, Policy};
use crate::spec::InterceptorSpec;

pub const TEMPLATE_LOG_REQUEST: &str = "log_request.mustache";
pub const TEMPLATE_LOG_RESPONSE: &str = "log_response.mustache";

#[derive(Clone, Copy, Debug, Default)]
pub struct LogInterceptor;

impl Interceptor for LogInterceptor {
    fn kind(&self) -> InterceptorKind {
        InterceptorKind::Log
    }

    fn template_file(&self, point: ExecutionPoint) -> &'static str {
        match point {
            ExecutionPoint::Request => TEMPLATE_LOG_REQUEST,
            ExecutionPoint::Response => TEMPLATE_LOG_RESPONSE,
        }
    }

    fn parse_content(&self, raw: &str, point: ExecutionPoint) -> Result<Policy, InterceptError> {
        // An empty body means "log with defaults".
        if raw.trim().is_empty() {
            return Ok(Policy::Log(LogPolicy::default()));
        }
        parse_json(raw, self.kind(), self.template_file(point)).map(Policy::Log)
    }

    fn build_parameters(
        &self,
        policy: &Policy,
        mut params: ParameterBag,
        spec: &InterceptorSpec,
    ) -> Result<ParameterBag, InterceptError> {
        let Policy::Log(policy) = policy else {
            return Err(mismatch(self.kind(), self.template_file(spec.execution_point), policy));
        };
        params.insert("message", policy.message.clone().unwrap_or_default());
        params.insert("execution_point", spec.execution_point.as_str());
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_content_names_the_template_of_its_point() {
        for (point, template) in [
            (ExecutionPoint::Request, TEMPLATE_LOG_REQUEST),
            (ExecutionPoint::Response, TEMPLATE_LOG_RESPONSE),
        ] {
            let err = LogInterceptor.parse_content(r#"{"bogus": 1}"#, point).unwrap_err();
            assert_eq!(err.0.meta_str("template"), Some(template));
            assert!(err.0.message_user.contains(template), "{}", err.0.message_user);
        }
    }

    #[test]
    fn empty_content_logs_with_defaults() {
        let policy = LogInterceptor.parse_content("  ", ExecutionPoint::Response).unwrap();
        assert_eq!(policy, Policy::Log(LogPolicy::default()));
    }
}
