use crate::dispatch::CallScope;
use crate::errors::InterceptError;
use crate::kind::InterceptorKind;
use crate::params::{self, ParameterBag};
use crate::policy::Policy;
use crate::spec::InterceptorSpec;
use crate::variants::{
    BlacklistInterceptor, Interceptor, LogInterceptor, MockInterceptor, RattingInterceptor,
    WhitelistInterceptor,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Interceptor variants keyed by kind. Built once at startup.
#[derive(Clone, Default)]
pub struct InterceptorRegistry {
    variants: HashMap<InterceptorKind, Arc<dyn Interceptor>>,
}

/// A parsed and bound interceptor, ready to be rendered.
#[derive(Clone, Debug, Serialize)]
pub struct Prepared {
    pub kind: InterceptorKind,
    pub template: &'static str,
    pub policy: Policy,
    pub params: ParameterBag,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every interceptor kind the gateway ships.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RattingInterceptor));
        registry.register(Arc::new(MockInterceptor));
        registry.register(Arc::new(BlacklistInterceptor));
        registry.register(Arc::new(WhitelistInterceptor));
        registry.register(Arc::new(LogInterceptor));
        registry
    }

    /// Registers `variant` under its own kind, replacing any previous one.
    pub fn register(&mut self, variant: Arc<dyn Interceptor>) {
        self.variants.insert(variant.kind(), variant);
    }

    pub fn get(&self, kind: InterceptorKind) -> Result<&Arc<dyn Interceptor>, InterceptError> {
        self.variants
            .get(&kind)
            .ok_or_else(|| InterceptError::unknown_kind(kind.as_str()))
    }

    pub fn contains(&self, kind: InterceptorKind) -> bool {
        self.variants.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<InterceptorKind> {
        let mut kinds: Vec<_> = self.variants.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Parses and binds `spec` without rendering it.
    pub fn prepare(
        &self,
        spec: &InterceptorSpec,
        scope: &CallScope,
    ) -> Result<Prepared, InterceptError> {
        let variant = self.get(spec.kind)?;
        let template = variant.template_file(spec.execution_point);
        let policy = variant.parse_content(&spec.content, spec.execution_point)?;
        let params = variant.build_parameters(&policy, seed(spec, scope), spec)?;
        Ok(Prepared {
            kind: spec.kind,
            template,
            policy,
            params,
        })
    }
}

/// Dispatcher defaults every bag starts from.
fn seed(spec: &InterceptorSpec, scope: &CallScope) -> ParameterBag {
    ParameterBag::new()
        .with(params::INTERCEPTOR_ID, spec.id.as_str())
        .with(params::NAME, spec.name.as_str())
        .with(params::API_ID, scope.api_id.as_str())
        .with(params::OPERATION_ID, scope.operation_id.as_str())
        .with(params::EXECUTION_POINT, spec.execution_point.as_str())
        .with(params::ORDER, spec.order)
}
