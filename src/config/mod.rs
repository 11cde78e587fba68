//! Gateway configuration.
//!
//! A [`GatewayConfig`] comes from a YAML file with `GATEHOUSE__*` environment
//! overlays applied on top (see [`loader`]), and is validated before use.

pub mod loader;

use crate::errors::{GatewayError, GatewayResult};
use gatehouse_interceptors::{InterceptorRegistry, InterceptorSpec};
use gatehouse_trace::TraceSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub use loader::{load_config, load_config_with_options, LoadOptions};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub trace: TraceSettings,
    pub pool: PoolConfig,
    pub upstream: UpstreamConfig,
    pub apis: Vec<ApiConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Execution units available to in-flight calls.
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 16 }
    }
}

/// Upstream call bound, plus the canned reply of the static upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub timeout_ms: u64,
    pub status: u16,
    pub body: serde_json::Value,
    pub latency_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            status: 200,
            body: serde_json::json!({ "ok": true }),
            latency_ms: 0,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub app_developer: Option<String>,
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationConfig {
    pub id: String,
    /// Path this operation answers. A trailing `/**` matches any suffix.
    pub pattern: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub interceptors: Vec<InterceptorSpec>,
}

impl OperationConfig {
    pub fn matches(&self, path: &str) -> bool {
        match self.pattern.strip_suffix("/**") {
            Some(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            None => path == self.pattern,
        }
    }
}

impl ApiConfig {
    /// First operation whose pattern matches `path`.
    pub fn route(&self, path: &str) -> Option<&OperationConfig> {
        self.operations.iter().find(|op| op.matches(path))
    }
}

impl GatewayConfig {
    pub fn api(&self, id: &str) -> Option<&ApiConfig> {
        self.apis.iter().find(|api| api.id == id)
    }

    pub fn validate(&self, registry: &InterceptorRegistry) -> GatewayResult<()> {
        if self.pool.workers == 0 {
            return Err(GatewayError::config_invalid("pool.workers must be >= 1"));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(GatewayError::config_invalid("upstream.timeout_ms must be >= 1"));
        }

        let mut api_ids = HashSet::new();
        for api in &self.apis {
            if !api_ids.insert(api.id.as_str()) {
                return Err(GatewayError::config_invalid(format!(
                    "duplicate api id {}",
                    api.id
                )));
            }
            let mut op_ids = HashSet::new();
            for op in &api.operations {
                if !op_ids.insert(op.id.as_str()) {
                    return Err(GatewayError::config_invalid(format!(
                        "duplicate operation id {} in api {}",
                        op.id, api.id
                    )));
                }
                let mut names = HashSet::new();
                for spec in &op.interceptors {
                    if !names.insert(spec.name.as_str()) {
                        return Err(GatewayError::config_invalid(format!(
                            "duplicate interceptor name {} in operation {}/{}",
                            spec.name, api.id, op.id
                        )));
                    }
                    if !registry.contains(spec.kind) {
                        return Err(GatewayError::config_invalid(format!(
                            "interceptor {} uses unregistered kind {}",
                            spec.name, spec.kind
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
