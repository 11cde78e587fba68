use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::GatewayConfig;
use crate::errors::{GatewayError, GatewayResult};

const ENV_PREFIX: &str = "GATEHOUSE__";
const ENV_JSON: &str = "GATEHOUSE_CONFIG_JSON";

#[derive(Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
}

impl LoadOptions {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
            include_env: true,
        }
    }
}

/// Loads defaults, then `path` (if it exists), then environment overlays.
pub fn load_config(path: Option<&Path>) -> GatewayResult<GatewayConfig> {
    let mut options = LoadOptions {
        include_env: true,
        ..LoadOptions::default()
    };
    if let Some(p) = path {
        options.paths.push(p.to_path_buf());
    }
    load_config_with_options(&options)
}

pub fn load_config_with_options(options: &LoadOptions) -> GatewayResult<GatewayConfig> {
    let mut document = serde_json::to_value(GatewayConfig::default())?;

    for path in &options.paths {
        if path.exists() {
            let file = document_from_file(path)?;
            merge(&mut document, file);
            info!(path = %path.display(), "loaded gateway configuration");
        } else {
            debug!(path = %path.display(), "config file not found; skipping");
        }
    }

    if options.include_env {
        for overlay in overlays_from_env()? {
            apply_overlay(&mut document, &overlay.path, overlay.value)?;
        }
    }

    Ok(serde_json::from_value(document)?)
}

struct ConfigOverlay {
    path: Vec<String>,
    value: Value,
}

fn document_from_file(path: &Path) -> GatewayResult<Value> {
    let content = fs::read_to_string(path)?;
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)?;
    Ok(serde_json::to_value(yaml_value)?)
}

fn overlays_from_env() -> GatewayResult<Vec<ConfigOverlay>> {
    let mut vars: Vec<(String, String)> = env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    // Deterministic order: shorter paths first so nested keys win.
    vars.sort();

    let mut overlays = Vec::new();
    for (key, raw) in vars {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_ascii_lowercase())
            .collect();
        if path.is_empty() {
            continue;
        }
        overlays.push(ConfigOverlay {
            path,
            value: parse_env_value(&raw),
        });
    }

    if let Ok(raw_json) = env::var(ENV_JSON) {
        if !raw_json.trim().is_empty() {
            let json_value: Value = serde_json::from_str(&raw_json)?;
            overlays.extend(flatten_value(json_value, Vec::new()));
        }
    }

    Ok(overlays)
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Bool(boolean);
    }
    Value::String(raw.to_string())
}

fn flatten_value(value: Value, prefix: Vec<String>) -> Vec<ConfigOverlay> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .flat_map(|(key, value)| {
                let mut next = prefix.clone();
                next.push(key.trim().to_ascii_lowercase());
                flatten_value(value, next)
            })
            .collect(),
        other if !prefix.is_empty() => vec![ConfigOverlay {
            path: prefix,
            value: other,
        }],
        _ => Vec::new(),
    }
}

/// Deep-merges `overlay` into `base`; objects merge key by key, anything
/// else replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Sets `value` at `path`. Numeric segments index into arrays; missing
/// object keys are created.
fn apply_overlay(document: &mut Value, path: &[String], value: Value) -> GatewayResult<()> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };

    let mut cursor = document;
    for segment in parents {
        cursor = step(cursor, segment, path)?;
    }

    match cursor {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|idx| items.get_mut(idx))
                .ok_or_else(|| bad_path(path))?;
            *slot = value;
            Ok(())
        }
        _ => Err(bad_path(path)),
    }
}

fn step<'v>(cursor: &'v mut Value, segment: &str, path: &[String]) -> GatewayResult<&'v mut Value> {
    if cursor.is_null() {
        *cursor = Value::Object(Map::new());
    }
    match cursor {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |idx| items.get_mut(idx))
            .ok_or_else(|| bad_path(path)),
        _ => Err(bad_path(path)),
    }
}

fn bad_path(path: &[String]) -> GatewayError {
    GatewayError::config_invalid(format!(
        "environment override {ENV_PREFIX}{} does not address a config field",
        path.join("__").to_ascii_uppercase()
    ))
}
