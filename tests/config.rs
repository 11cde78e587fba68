use gatehouse::config::{load_config, load_config_with_options, LoadOptions};
use gatehouse::{Gateway, GatewayConfig};
use gatehouse_interceptors::{ExecutionPoint, InterceptorKind};
use gatehouse_trace::prelude::*;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const GATEWAY_YAML: &str = r#"
trace:
  print_logstash: true
  profile: dev
pool:
  workers: 2
upstream:
  timeout_ms: 1000
apis:
  - id: orders
    name: Orders API
    operations:
      - id: list-orders
        pattern: /orders/**
        interceptors:
          - id: rl-1
            name: rate-limit
            kind: RATTING
            execution_point: REQUEST
            content: '{"calls": 1, "interval": "MINUTES"}'
          - id: log-1
            name: access-log
            kind: LOG
            execution_point: RESPONSE
            content: ''
            order: 5
"#;

fn yaml_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Removes the variables it set when dropped.
struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self(vars.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.0 {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn yaml_file_is_parsed_into_typed_config() {
    let file = yaml_file(GATEWAY_YAML);
    let config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.pool.workers, 2);
    assert_eq!(config.upstream.timeout_ms, 1000);
    assert_eq!(config.upstream.status, 200);
    assert!(config.trace.print_logstash);
    assert!(!config.trace.print_all_trace);
    assert_eq!(config.trace.profile.as_deref(), Some("dev"));

    let op = &config.api("orders").unwrap().operations[0];
    assert_eq!(op.interceptors.len(), 2);
    assert_eq!(op.interceptors[0].kind, InterceptorKind::Ratting);
    assert_eq!(op.interceptors[1].execution_point, ExecutionPoint::Response);
    assert_eq!(op.interceptors[1].order, 5);
}

#[test]
#[serial]
fn environment_overrides_win_over_the_file() {
    let file = yaml_file(GATEWAY_YAML);
    let _env = EnvGuard::set(&[
        ("GATEHOUSE__POOL__WORKERS", "6"),
        ("GATEHOUSE__UPSTREAM__TIMEOUT_MS", "250"),
        ("GATEHOUSE__TRACE__PRINT_ALL_TRACE", "true"),
        ("GATEHOUSE__TRACE__PROFILE", "staging"),
        ("GATEHOUSE__APIS__0__NAME", "Orders v2"),
    ]);

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.pool.workers, 6);
    assert_eq!(config.upstream.timeout_ms, 250);
    assert!(config.trace.print_all_trace);
    assert_eq!(config.trace.profile.as_deref(), Some("staging"));
    assert_eq!(config.apis[0].name, "Orders v2");
    assert_eq!(config.apis[0].operations.len(), 1);
}

#[test]
#[serial]
fn env_can_be_skipped() {
    let _env = EnvGuard::set(&[("GATEHOUSE__POOL__WORKERS", "9")]);
    let options = LoadOptions {
        paths: Vec::new(),
        include_env: false,
    };
    let config = load_config_with_options(&options).unwrap();
    assert_eq!(config, GatewayConfig::default());
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let config = load_config(Some(missing.as_path())).unwrap();
    assert_eq!(config.pool.workers, 16);
    assert!(config.apis.is_empty());
}

#[test]
#[serial]
fn unknown_interceptor_kind_is_a_config_error() {
    let file = yaml_file(&GATEWAY_YAML.replace("kind: LOG", "kind: OAUTH"));
    let err = load_config(Some(file.path())).unwrap_err();
    assert_eq!(err.code().0, "CONFIG.INVALID");
}

#[test]
#[serial]
fn overriding_a_missing_array_entry_fails() {
    let file = yaml_file(GATEWAY_YAML);
    let _env = EnvGuard::set(&[("GATEHOUSE__APIS__4__NAME", "ghost")]);
    let err = load_config(Some(file.path())).unwrap_err();
    assert_eq!(err.code().0, "CONFIG.INVALID");
    assert!(err.dev_message().unwrap().contains("GATEHOUSE__APIS__4__NAME"));
}

#[test]
#[serial]
fn loaded_config_drives_the_gateway() {
    let file = yaml_file(GATEWAY_YAML);
    let config = load_config(Some(file.path())).unwrap();
    let logstash = MemorySink::new(SinkTarget::Logstash);
    let gateway = Gateway::builder(config)
        .emitter(
            TraceEmitter::new(Arc::new(MemorySink::new(SinkTarget::Primary)))
                .with_logstash(Arc::new(logstash.clone())),
        )
        .build()
        .unwrap();

    let statuses: Vec<u16> = tokio_test::block_on(async {
        let mut statuses = Vec::new();
        for _ in 0..2 {
            let call = InboundCall::new("POST", "http://gw.local/orders").with_header("client_id", "c-1");
            statuses.push(gateway.handle("orders", call).await.unwrap().status());
        }
        statuses
    });
    assert_eq!(statuses, [200, 429]);
    assert_eq!(logstash.len(), 2);
    assert_eq!(logstash.records()[1].0, LogTier::Warn);
}
