//! The call pipeline.
//!
//! lease unit -> create and bind trace -> request interceptors -> upstream
//! (bounded by timeout) -> response interceptors -> flush trace -> release
//! binding -> return unit.

use gatehouse_interceptors::prelude::*;
use gatehouse_ratelimit::RateLimiter;
use gatehouse_trace::prelude::*;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ApiConfig, GatewayConfig, OperationConfig};
use crate::errors::{GatewayError, GatewayResult};
use crate::pool::ExecutionPool;
use crate::upstream::{StaticUpstream, Upstream};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Result of one call through the gateway.
#[derive(Clone, Debug)]
pub struct GatewayReply {
    pub call_id: String,
    pub unit: UnitId,
    pub response: GatewayResponse,
    /// Sink delivery of the call's trace.
    pub report: Option<EmitReport>,
}

impl GatewayReply {
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

pub struct GatewayBuilder {
    config: GatewayConfig,
    registry: Option<InterceptorRegistry>,
    limiter: Option<RateLimiter>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    emitter: Option<TraceEmitter>,
    upstream: Option<Arc<dyn Upstream>>,
}

impl GatewayBuilder {
    pub fn registry(mut self, registry: InterceptorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Limiter used by the native renderer. Ignored when a renderer is set.
    pub fn limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn emitter(mut self, emitter: TraceEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn build(self) -> GatewayResult<Gateway> {
        let registry = self.registry.unwrap_or_else(InterceptorRegistry::builtin);
        self.config.validate(&registry)?;

        let mut settings = self.config.trace.clone();
        if settings.version.is_none() {
            settings.version = Some(crate::build_version().to_string());
        }

        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(NativeRenderer::new(
                self.limiter.unwrap_or_else(RateLimiter::in_memory),
            )),
        };
        let upstream = self
            .upstream
            .unwrap_or_else(|| Arc::new(StaticUpstream::from_config(&self.config.upstream)));

        let holder = Arc::new(TraceContextHolder::new());
        let dispatcher = Dispatcher::new(Arc::new(registry), renderer, Arc::clone(&holder));
        Ok(Gateway {
            pool: ExecutionPool::new(self.config.pool.workers)?,
            config: Arc::new(self.config),
            settings,
            holder,
            dispatcher,
            emitter: self.emitter.unwrap_or_else(TraceEmitter::logging),
            upstream,
        })
    }
}

pub struct Gateway {
    config: Arc<GatewayConfig>,
    settings: TraceSettings,
    pool: ExecutionPool,
    holder: Arc<TraceContextHolder>,
    dispatcher: Dispatcher,
    emitter: TraceEmitter,
    upstream: Arc<dyn Upstream>,
}

impl Gateway {
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder {
            config,
            registry: None,
            limiter: None,
            renderer: None,
            emitter: None,
            upstream: None,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn holder(&self) -> &Arc<TraceContextHolder> {
        &self.holder
    }

    pub fn pool(&self) -> &ExecutionPool {
        &self.pool
    }

    /// Runs `call` against API `api_id`.
    ///
    /// Policy refusals, configuration errors and upstream failures all come
    /// back as a reply with the matching status. `Err` means the call never
    /// got an execution unit or a trace.
    ///
    /// Dropping the returned future part way (a caller that disconnected)
    /// still flushes the trace, with status 499.
    pub async fn handle(&self, api_id: &str, call: InboundCall) -> GatewayResult<GatewayReply> {
        let call_id = Uuid::new_v4().to_string();
        let lease = self.pool.acquire().await?;
        let unit = lease.unit();

        let trace: SharedTrace = Arc::new(Mutex::new(Trace::new(&self.settings, &call)));
        let binding = self.holder.bind(unit, &trace)?;
        let call_trace = CallTrace::new(trace, self.emitter.clone(), binding);

        let response = self
            .process(unit, api_id, &call, &call_id)
            .await
            .with_header(REQUEST_ID_HEADER, call_id.as_str());
        call_trace.trace().lock().response = Some(MessageRecord::response(
            response.status,
            response.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &response.body,
        ));
        let report = call_trace.finish(response.status);
        drop(lease);

        debug!(%call_id, %unit, status = response.status, "call finished");
        Ok(GatewayReply {
            call_id,
            unit,
            response,
            report,
        })
    }

    async fn process(
        &self,
        unit: UnitId,
        api_id: &str,
        call: &InboundCall,
        call_id: &str,
    ) -> GatewayResponse {
        let Some(api) = self.config.api(api_id) else {
            return self.not_found(unit, format!("no api {api_id}"));
        };
        let path = call.path();
        let Some(operation) = api.route(&path) else {
            return self.not_found(unit, format!("no operation of {api_id} matches {path}"));
        };
        self.annotate(unit, |trace| describe(trace, api, operation));

        let scope = CallScope::new(api.id.as_str(), operation.id.as_str());
        let view = CallView::new(unit, call);
        let specs = &operation.interceptors;

        match self
            .dispatcher
            .run(ExecutionPoint::Request, specs, &scope, &view)
            .await
        {
            Ok(DispatchOutcome::Continue) => {}
            Ok(DispatchOutcome::ShortCircuit { response, .. }) => return response,
            Err(err) => return self.fail(unit, err.into(), call_id),
        }

        let started = Instant::now();
        let timeout = self.config.upstream.timeout();
        let upstream = match tokio::time::timeout(timeout, self.upstream.forward(call)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return self.fail(unit, err, call_id),
            Err(_) => {
                warn!(url = %call.url, timeout_ms = self.config.upstream.timeout_ms, "upstream timed out");
                let err = GatewayError::upstream_timeout(self.config.upstream.timeout_ms);
                return self.fail(unit, err, call_id);
            }
        };
        self.annotate(unit, |trace| {
            trace.trace_with(
                "upstream responded",
                &json!({
                    "status": upstream.status,
                    "elapsed_ms": started.elapsed().as_millis() as u64,
                }),
            );
        });

        let view = view.with_response_status(upstream.status);
        match self
            .dispatcher
            .run(ExecutionPoint::Response, specs, &scope, &view)
            .await
        {
            Ok(DispatchOutcome::Continue) => upstream,
            Ok(DispatchOutcome::ShortCircuit { response, .. }) => response,
            Err(err) => self.fail(unit, err.into(), call_id),
        }
    }

    fn annotate(&self, unit: UnitId, f: impl FnOnce(&mut Trace)) {
        if let Err(err) = self.holder.with_current(unit, f) {
            warn!(%unit, error = ?err.0.message_dev, "trace unavailable for annotation");
        }
    }

    fn not_found(&self, unit: UnitId, reason: String) -> GatewayResponse {
        self.annotate(unit, |trace| {
            trace.trace(reason.as_str());
        });
        GatewayResponse::new(404, json!({ "code": "ROUTE.NOT_FOUND", "message": reason }))
    }

    /// Records `err` on the trace and renders it as the call's response.
    fn fail(&self, unit: UnitId, err: GatewayError, call_id: &str) -> GatewayResponse {
        let err = err.with_correlation(call_id);
        self.annotate(unit, |trace| {
            trace.stack_trace = Some(StackTrace::from_error(err.inner()));
        });
        GatewayResponse::from_error(&InterceptError::from(err))
    }
}

fn describe(trace: &mut Trace, api: &ApiConfig, operation: &OperationConfig) {
    trace.api_id = Some(api.id.clone());
    trace.api_name = Some(api.name.clone());
    trace.app = api.app.clone();
    trace.app_developer = api.app_developer.clone();
    trace.operation_id = Some(operation.id.clone());
    trace.resource_id = operation.resource_id.clone();
    trace.pattern = Some(operation.pattern.clone());
}
