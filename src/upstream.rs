use async_trait::async_trait;
use gatehouse_interceptors::GatewayResponse;
use gatehouse_trace::InboundCall;
use serde_json::Value;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::errors::GatewayResult;

/// The service an admitted call is forwarded to.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, call: &InboundCall) -> GatewayResult<GatewayResponse>;
}

/// Answers every call with the same status and body after an optional delay.
#[derive(Clone, Debug)]
pub struct StaticUpstream {
    status: u16,
    body: Value,
    latency: Duration,
}

impl StaticUpstream {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(config.status, config.body.clone())
            .with_latency(Duration::from_millis(config.latency_ms))
    }
}

#[async_trait]
impl Upstream for StaticUpstream {
    async fn forward(&self, _call: &InboundCall) -> GatewayResult<GatewayResponse> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(GatewayResponse::new(self.status, self.body.clone()))
    }
}
