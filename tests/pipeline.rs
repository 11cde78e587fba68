use async_trait::async_trait;
use gatehouse::config::{ApiConfig, OperationConfig};
use gatehouse::{Gateway, GatewayConfig, GatewayResult, StaticUpstream, Upstream};
use gatehouse_interceptors::prelude::*;
use gatehouse_trace::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Sinks {
    primary: MemorySink,
    mongo: MemorySink,
}

impl Sinks {
    fn new() -> Self {
        Self {
            primary: MemorySink::new(SinkTarget::Primary),
            mongo: MemorySink::new(SinkTarget::Mongo),
        }
    }

    fn emitter(&self) -> TraceEmitter {
        TraceEmitter::new(Arc::new(self.primary.clone())).with_mongo(Arc::new(self.mongo.clone()))
    }

    /// Flushed traces, as JSON, in flush order.
    fn traces(&self) -> Vec<(LogTier, Value)> {
        self.primary
            .records()
            .into_iter()
            .map(|(tier, record)| {
                let json = match record {
                    SinkRecord::Dump(json) => json,
                    SinkRecord::Summary { call, .. } => call.expect("summary carries the call"),
                };
                (tier, serde_json::from_str(&json).unwrap())
            })
            .collect()
    }
}

/// Upstream that counts forwarded calls.
#[derive(Default)]
struct CountingUpstream {
    calls: AtomicUsize,
}

#[async_trait]
impl Upstream for CountingUpstream {
    async fn forward(&self, _call: &InboundCall) -> GatewayResult<GatewayResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayResponse::new(200, json!({ "upstream": true })))
    }
}

fn config(interceptors: Vec<InterceptorSpec>) -> GatewayConfig {
    GatewayConfig {
        apis: vec![ApiConfig {
            id: "orders".into(),
            name: "Orders API".into(),
            app: Some("storefront".into()),
            app_developer: None,
            operations: vec![OperationConfig {
                id: "list-orders".into(),
                pattern: "/orders/**".into(),
                resource_id: Some("orders".into()),
                interceptors,
            }],
        }],
        ..GatewayConfig::default()
    }
}

fn rate_limit(content: &str) -> InterceptorSpec {
    InterceptorSpec::new(
        "rl-orders",
        "rate-limit",
        InterceptorKind::Ratting,
        ExecutionPoint::Request,
        content,
    )
}

fn orders_call(client: &str) -> InboundCall {
    InboundCall::new("GET", "http://gw.local/orders/17").with_header("client_id", client)
}

#[tokio::test]
async fn calls_over_quota_get_429_with_retry_after() {
    let sinks = Sinks::new();
    let gateway = Gateway::builder(config(vec![rate_limit(r#"{"calls": 2, "interval": "MINUTE"}"#)]))
        .emitter(sinks.emitter())
        .build()
        .unwrap();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
        statuses.push(reply.status());
        if reply.status() == 429 {
            let secs: u64 = reply.response.header("Retry-After").unwrap().parse().unwrap();
            assert!(secs > 0 && secs <= 60);
            assert_eq!(reply.response.body["retry_after_secs"], json!(secs));
        }
    }
    assert_eq!(statuses, [200, 200, 429]);

    let traces = sinks.traces();
    let tiers: Vec<_> = traces.iter().map(|(tier, _)| *tier).collect();
    assert_eq!(tiers, [LogTier::Info, LogTier::Info, LogTier::Warn]);
    let (_, last) = &traces[2];
    assert_eq!(last["resultStatus"], 429);
    assert_eq!(last["filters"]["rate-limit"]["status"], "REJECTED");
    assert_eq!(last["apiId"], "orders");
    assert_eq!(last["operationId"], "list-orders");
    assert_eq!(last["clientId"], "app-1");

    assert_eq!(gateway.holder().bound_units(), 0);
    assert!(sinks.mongo.is_empty());
}

#[tokio::test]
async fn invalid_content_fails_the_call_with_422() {
    let sinks = Sinks::new();
    let upstream = Arc::new(CountingUpstream::default());
    let gateway = Gateway::builder(config(vec![rate_limit(r#"{"calls": "abc"}"#)]))
        .emitter(sinks.emitter())
        .upstream(upstream.clone())
        .build()
        .unwrap();

    let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
    assert_eq!(reply.status(), 422);
    assert_eq!(reply.response.body["code"], "INTERCEPTOR.INVALID_CONTENT");
    assert_eq!(reply.response.body["details"]["interceptor_kind"], "RATTING");
    assert_eq!(reply.response.body["details"]["template"], "ratting.mustache");
    assert_eq!(reply.response.body["correlation_id"], json!(reply.call_id));
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);

    let (tier, trace) = &sinks.traces()[0];
    assert_eq!(*tier, LogTier::Warn);
    assert_eq!(trace["filters"]["rate-limit"]["status"], "FAILED");
    assert_eq!(trace["stackTrace"]["code"], "INTERCEPTOR.INVALID_CONTENT");
    assert_eq!(trace["stackTrace"]["kind"], "InvalidContent");
    assert_eq!(trace["stackTrace"]["meta"]["template"], "ratting.mustache");
    assert_eq!(gateway.holder().bound_units(), 0);
}

#[tokio::test]
async fn forwarded_addresses_are_joined_in_header_order() {
    let sinks = Sinks::new();
    let gateway = Gateway::builder(config(Vec::new()))
        .emitter(sinks.emitter())
        .build()
        .unwrap();

    let call = InboundCall::new("GET", "http://gw.local/orders")
        .with_header("X-Forwarded-For", "1.2.3.4")
        .with_header("X-Forwarded-For", "5.6.7.8");
    let reply = gateway.handle("orders", call).await.unwrap();
    assert_eq!(reply.status(), 200);

    let (_, trace) = &sinks.traces()[0];
    assert_eq!(trace["receivedFromAddress"], "1.2.3.4,5.6.7.8");
    assert_eq!(trace["pattern"], "/orders/**");
}

#[tokio::test]
async fn trace_records_request_and_response() {
    let sinks = Sinks::new();
    let gateway = Gateway::builder(config(Vec::new()))
        .emitter(sinks.emitter())
        .build()
        .unwrap();

    let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
    assert_eq!(reply.status(), 200);

    let (_, trace) = &sinks.traces()[0];
    assert_eq!(trace["request"]["method"], "GET");
    assert_eq!(trace["request"]["uri"], "http://gw.local/orders/17");
    assert_eq!(trace["request"]["headers"]["client_id"], "app-1");
    assert_eq!(trace["response"]["status"], 200);
    assert_eq!(trace["response"]["headers"]["x-request-id"], json!(reply.call_id));
    assert_eq!(trace["response"]["body"], json!({ "ok": true }));
}

#[tokio::test]
async fn fragments_do_not_affect_routing() {
    let gateway = Gateway::builder(config(Vec::new()))
        .emitter(Sinks::new().emitter())
        .build()
        .unwrap();

    let call = InboundCall::new("GET", "http://gw.local/orders/17?page=2#top");
    let reply = gateway.handle("orders", call).await.unwrap();
    assert_eq!(reply.status(), 200);
}

#[tokio::test]
async fn disconnected_caller_still_gets_a_trace() {
    let sinks = Sinks::new();
    let mut cfg = config(Vec::new());
    cfg.pool.workers = 2;
    let gateway = Gateway::builder(cfg)
        .emitter(sinks.emitter())
        .upstream(Arc::new(
            StaticUpstream::new(200, json!({})).with_latency(Duration::from_millis(300)),
        ))
        .build()
        .unwrap();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        gateway.handle("orders", orders_call("app-1")),
    )
    .await;
    assert!(abandoned.is_err());

    assert_eq!(gateway.holder().bound_units(), 0);
    assert_eq!(gateway.pool().available(), 2);
    let traces = sinks.traces();
    assert_eq!(traces.len(), 1);
    let (tier, trace) = &traces[0];
    assert_eq!(*tier, LogTier::Warn);
    assert_eq!(trace["resultStatus"], CLIENT_CLOSED_STATUS);
    assert_eq!(trace["apiId"], "orders");
    assert!(trace.get("response").is_none());
}

#[tokio::test]
async fn upstream_timeout_is_flushed_as_504() {
    let sinks = Sinks::new();
    let mut cfg = config(Vec::new());
    cfg.upstream.timeout_ms = 20;
    let gateway = Gateway::builder(cfg)
        .emitter(sinks.emitter())
        .upstream(Arc::new(
            StaticUpstream::new(200, json!({})).with_latency(Duration::from_millis(500)),
        ))
        .build()
        .unwrap();

    let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
    assert_eq!(reply.status(), 504);
    assert_eq!(reply.response.body["code"], "UPSTREAM.TIMEOUT");

    let (tier, trace) = &sinks.traces()[0];
    assert_eq!(*tier, LogTier::Error);
    assert_eq!(trace["resultStatus"], 504);
    assert_eq!(trace["stackTrace"]["code"], "UPSTREAM.TIMEOUT");
    assert!(trace["durationMillis"].as_u64().is_some());
    assert_eq!(gateway.holder().bound_units(), 0);
}

#[tokio::test]
async fn execution_units_are_reused_without_stale_bindings() {
    let mut cfg = config(Vec::new());
    cfg.pool.workers = 1;
    let gateway = Gateway::builder(cfg)
        .emitter(Sinks::new().emitter())
        .build()
        .unwrap();

    for _ in 0..3 {
        let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
        assert_eq!(reply.unit, UnitId(0));
        assert_eq!(reply.status(), 200);
        assert!(!gateway.holder().is_bound(UnitId(0)));
    }
    assert_eq!(gateway.pool().available(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_admit_exactly_the_quota() {
    let mut cfg = config(vec![rate_limit(r#"{"calls": 5, "interval": "HOUR"}"#)]);
    cfg.pool.workers = 4;
    let gateway = Arc::new(
        Gateway::builder(cfg)
            .emitter(Sinks::new().emitter())
            .build()
            .unwrap(),
    );

    let mut tasks = Vec::new();
    for _ in 0..40 {
        let gateway = Arc::clone(&gateway);
        tasks.push(tokio::spawn(async move {
            gateway.handle("orders", orders_call("app-1")).await.unwrap().status()
        }));
    }
    let mut admitted = 0;
    for task in tasks {
        if task.await.unwrap() == 200 {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 5);
    assert_eq!(gateway.holder().bound_units(), 0);
    assert_eq!(gateway.pool().available(), 4);
}

#[tokio::test]
async fn mock_short_circuits_the_upstream() {
    let upstream = Arc::new(CountingUpstream::default());
    let gateway = Gateway::builder(config(vec![InterceptorSpec::new(
        "mock-1",
        "mock",
        InterceptorKind::Mock,
        ExecutionPoint::Request,
        r#"{"status": 418, "body": {"teapot": true}}"#,
    )]))
    .emitter(Sinks::new().emitter())
    .upstream(upstream.clone())
    .build()
    .unwrap();

    let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
    assert_eq!(reply.status(), 418);
    assert_eq!(reply.response.body["teapot"], true);
    assert!(reply.response.header("x-request-id").is_some());
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn response_interceptors_see_the_upstream_status() {
    let sinks = Sinks::new();
    let mut cfg = config(vec![InterceptorSpec::new(
        "log-1",
        "access-log",
        InterceptorKind::Log,
        ExecutionPoint::Response,
        r#"{"message": "order listed"}"#,
    )]);
    cfg.trace.print_all_trace = true;
    cfg.trace.print_mongo = true;
    cfg.upstream.status = 202;
    let gateway = Gateway::builder(cfg).emitter(sinks.emitter()).build().unwrap();

    let reply = gateway.handle("orders", orders_call("app-1")).await.unwrap();
    assert_eq!(reply.status(), 202);

    assert!(sinks.primary.records()[0].1.is_dump());
    assert_eq!(sinks.mongo.len(), 1);
    let (_, trace) = &sinks.traces()[0];
    let detail = &trace["filters"]["access-log"];
    assert_eq!(detail["status"], "ADMITTED");
    assert_eq!(detail["detail"]["status"], 202);
    assert_eq!(detail["detail"]["execution_point"], "RESPONSE");
}

#[tokio::test]
async fn unknown_routes_are_404_and_still_traced() {
    let sinks = Sinks::new();
    let gateway = Gateway::builder(config(Vec::new()))
        .emitter(sinks.emitter())
        .build()
        .unwrap();

    let reply = gateway.handle("billing", orders_call("app-1")).await.unwrap();
    assert_eq!(reply.status(), 404);
    let reply = gateway
        .handle("orders", InboundCall::new("GET", "http://gw.local/customers"))
        .await
        .unwrap();
    assert_eq!(reply.status(), 404);

    let traces = sinks.traces();
    assert_eq!(traces.len(), 2);
    assert!(traces.iter().all(|(tier, _)| *tier == LogTier::Warn));
    assert_eq!(gateway.holder().bound_units(), 0);
}

#[tokio::test]
async fn trace_version_defaults_to_build_version() {
    let sinks = Sinks::new();
    let gateway = Gateway::builder(config(Vec::new()))
        .emitter(sinks.emitter())
        .build()
        .unwrap();
    gateway.handle("orders", orders_call("app-1")).await.unwrap();

    let (_, trace) = &sinks.traces()[0];
    assert_eq!(trace["version"], gatehouse::build_version());
}
