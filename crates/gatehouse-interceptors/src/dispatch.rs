use crate::errors::InterceptError;
use crate::kind::ExecutionPoint;
use crate::registry::InterceptorRegistry;
use crate::render::{CallView, TemplateRenderer, Verdict};
use crate::response::GatewayResponse;
use crate::spec::InterceptorSpec;
use gatehouse_trace::{FilterDetail, FilterStatus, TraceContextHolder};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// API and operation the interceptors are attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallScope {
    pub api_id: String,
    pub operation_id: String,
}

impl CallScope {
    pub fn new(api_id: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            operation_id: operation_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// Every interceptor admitted the call.
    Continue,
    /// An interceptor answered the call; nothing after it ran.
    ShortCircuit {
        interceptor: String,
        response: GatewayResponse,
        rejected: bool,
    },
}

/// Runs an operation's interceptors and records each outcome in the trace
/// bound to the calling unit.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<InterceptorRegistry>,
    renderer: Arc<dyn TemplateRenderer>,
    holder: Arc<TraceContextHolder>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<InterceptorRegistry>,
        renderer: Arc<dyn TemplateRenderer>,
        holder: Arc<TraceContextHolder>,
    ) -> Self {
        Self {
            registry,
            renderer,
            holder,
        }
    }

    pub fn registry(&self) -> &Arc<InterceptorRegistry> {
        &self.registry
    }

    pub fn holder(&self) -> &Arc<TraceContextHolder> {
        &self.holder
    }

    /// Interceptors of `specs` that run at `point`, in configured order.
    pub fn select<'s>(
        point: ExecutionPoint,
        specs: &'s [InterceptorSpec],
    ) -> Vec<&'s InterceptorSpec> {
        let mut selected: Vec<_> = specs
            .iter()
            .filter(|spec| spec.execution_point == point)
            .collect();
        selected.sort_by_key(|spec| spec.order);
        selected
    }

    /// Runs the interceptors of `specs` registered for `point`.
    ///
    /// The first rejection or canned response stops the run. A parse, bind
    /// or render failure is recorded as `FAILED` and returned; it ends this
    /// call only.
    pub async fn run(
        &self,
        point: ExecutionPoint,
        specs: &[InterceptorSpec],
        scope: &CallScope,
        call: &CallView<'_>,
    ) -> Result<DispatchOutcome, InterceptError> {
        for spec in Self::select(point, specs) {
            let started = Instant::now();
            let verdict = match self.run_one(spec, scope, call).await {
                Ok(verdict) => verdict,
                Err(err) => {
                    warn!(
                        interceptor = %spec.name,
                        kind = spec.kind.as_str(),
                        code = err.code().0,
                        error = ?err.0.message_dev,
                        "interceptor failed"
                    );
                    let detail = json!({
                        "code": err.code().0,
                        "kind": spec.kind.as_str(),
                        "template": err.0.meta_str("template"),
                    });
                    let failed = FilterDetail::new(FilterStatus::Failed, started.elapsed(), Some(detail));
                    self.record(call, &spec.name, failed)?;
                    return Err(err);
                }
            };

            let (status, detail, short_circuit) = match verdict {
                Verdict::Admit { detail } => (FilterStatus::Admitted, detail, None),
                Verdict::Respond { response, detail } => {
                    (FilterStatus::Admitted, detail, Some((response, false)))
                }
                Verdict::Reject { response, detail } => {
                    (FilterStatus::Rejected, detail, Some((response, true)))
                }
            };
            self.record(call, &spec.name, FilterDetail::new(status, started.elapsed(), detail))?;

            if let Some((response, rejected)) = short_circuit {
                debug!(
                    interceptor = %spec.name,
                    status = response.status,
                    rejected,
                    "interceptor short-circuited call"
                );
                return Ok(DispatchOutcome::ShortCircuit {
                    interceptor: spec.name.clone(),
                    response,
                    rejected,
                });
            }
        }
        Ok(DispatchOutcome::Continue)
    }

    async fn run_one(
        &self,
        spec: &InterceptorSpec,
        scope: &CallScope,
        call: &CallView<'_>,
    ) -> Result<Verdict, InterceptError> {
        let variant = self.registry.get(spec.kind)?;
        let template = variant.template_file(spec.execution_point);
        let prepared = self
            .registry
            .prepare(spec, scope)
            .map_err(|err| err.for_interceptor(spec.kind, template))?;
        let check = self
            .renderer
            .render(prepared.template, &prepared.params)
            .map_err(|err| err.for_interceptor(spec.kind, template))?;
        check.evaluate(call).await
    }

    fn record(
        &self,
        call: &CallView<'_>,
        name: &str,
        detail: FilterDetail,
    ) -> Result<(), InterceptError> {
        self.holder
            .with_current(call.unit, |trace| trace.add_filter(name, detail))
            .map_err(InterceptError::from)
    }
}
