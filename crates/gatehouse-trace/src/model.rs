use crate::request::InboundCall;
use crate::settings::TraceSettings;
use chrono::{DateTime, Utc};
use gatehouse_errors::prelude::ErrorObj;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// A diagnostic message attached to a trace. Never changes once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneralTrace {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl GeneralTrace {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(message: impl Into<String>, payload: Value) -> Self {
        Self {
            message: message.into(),
            payload: Some(payload),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterStatus {
    Admitted,
    Rejected,
    Failed,
}

/// Outcome of one interceptor for one call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDetail {
    pub status: FilterStatus,
    pub time_in_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl FilterDetail {
    pub fn new(status: FilterStatus, elapsed: Duration, detail: Option<Value>) -> Self {
        Self {
            status,
            time_in_millis: elapsed.as_millis() as u64,
            detail,
        }
    }
}

/// Error summary recorded on calls that failed inside the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackTrace {
    pub code: String,
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl StackTrace {
    /// Audit rendering of `err` plus the message the caller was shown.
    pub fn from_error(err: &ErrorObj) -> Self {
        let audit = err.to_audit();
        Self {
            code: audit.code.to_string(),
            kind: audit.kind.to_string(),
            message: err.message_user.clone(),
            detail: audit.message_dev,
            meta: audit.meta,
        }
    }
}

/// Request or response as the gateway saw it. Repeated headers are joined
/// with `,`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl MessageRecord {
    pub fn request(call: &InboundCall) -> Self {
        Self {
            method: Some(call.method.clone()),
            uri: Some(call.url.clone()),
            status: None,
            headers: call
                .headers
                .iter()
                .map(|(name, values)| (name.clone(), values.join(",")))
                .collect(),
            body: None,
        }
    }

    pub fn response<'a>(
        status: u16,
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
        body: &Value,
    ) -> Self {
        let mut joined: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            joined
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        Self {
            method: None,
            uri: None,
            status: Some(status),
            headers: joined,
            body: (!body.is_null()).then(|| body.clone()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub method: String,
    pub url: String,
    result_status: Option<u16>,
    #[serde(skip)]
    initial_time: Instant,
    duration_millis: Option<u64>,
    inserted_on_date: DateTime<Utc>,
    pub api_id: Option<String>,
    pub api_name: Option<String>,
    pub app: Option<String>,
    pub access_token: Option<String>,
    pub received_from_address: Option<String>,
    pub client_id: Option<String>,
    pub resource_id: Option<String>,
    pub app_developer: Option<String>,
    pub operation_id: Option<String>,
    pub pattern: Option<String>,
    pub cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
    pub request: Option<MessageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<MessageRecord>,
    traces: Vec<GeneralTrace>,
    filters: BTreeMap<String, FilterDetail>,
    pub profile: Option<String>,
    pub version: Option<String>,
    #[serde(skip)]
    print_all_trace: bool,
    #[serde(skip)]
    print_mongo: bool,
    #[serde(skip)]
    print_logstash: bool,
}

impl Trace {
    pub fn new(settings: &TraceSettings, call: &InboundCall) -> Self {
        Self {
            method: call.method.clone(),
            url: call.url.clone(),
            result_status: None,
            initial_time: Instant::now(),
            duration_millis: None,
            inserted_on_date: Utc::now(),
            api_id: None,
            api_name: None,
            app: None,
            access_token: call.access_token().map(str::to_string),
            received_from_address: call.forwarded_for(),
            client_id: call.client_id().map(str::to_string),
            resource_id: None,
            app_developer: None,
            operation_id: None,
            pattern: None,
            cache: None,
            stack_trace: None,
            request: Some(MessageRecord::request(call)),
            response: None,
            traces: Vec::new(),
            filters: BTreeMap::new(),
            profile: settings.profile.clone(),
            version: settings.version.clone(),
            print_all_trace: settings.print_all_trace,
            print_mongo: settings.print_mongo,
            print_logstash: settings.print_logstash,
        }
    }

    pub fn trace(&mut self, message: impl Into<String>) -> &mut Self {
        self.traces.push(GeneralTrace::new(message));
        self
    }

    /// Appends a message with a structured payload. A payload that cannot be
    /// turned into JSON is replaced by the serializer's error text.
    pub fn trace_with<T: Serialize>(&mut self, message: impl Into<String>, payload: &T) -> &mut Self {
        let message = message.into();
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(err) => {
                warn!(%message, error = %err, "trace payload is not serializable");
                Value::String(format!("<unserializable: {err}>"))
            }
        };
        self.traces.push(GeneralTrace::with_payload(message, payload));
        self
    }

    /// Records an interceptor outcome; a second record under the same name
    /// replaces the first.
    pub fn add_filter(&mut self, name: impl Into<String>, detail: FilterDetail) {
        self.filters.insert(name.into(), detail);
    }

    pub fn traces(&self) -> &[GeneralTrace] {
        &self.traces
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterDetail> {
        &self.filters
    }

    pub fn filter(&self, name: &str) -> Option<&FilterDetail> {
        self.filters.get(name)
    }

    pub fn elapsed(&self) -> Duration {
        self.initial_time.elapsed()
    }

    pub fn inserted_on_date(&self) -> DateTime<Utc> {
        self.inserted_on_date
    }

    /// Stamps status and duration. Returns `false` if the trace was already
    /// finalized, in which case nothing changes.
    pub fn finalize(&mut self, status: u16) -> bool {
        if self.result_status.is_some() {
            return false;
        }
        self.result_status = Some(status);
        self.duration_millis = Some(self.elapsed().as_millis() as u64);
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.result_status.is_some()
    }

    pub fn result_status(&self) -> Option<u16> {
        self.result_status
    }

    pub fn duration_millis(&self) -> Option<u64> {
        self.duration_millis
    }

    pub fn print_all_trace(&self) -> bool {
        self.print_all_trace
    }

    pub fn print_mongo(&self) -> bool {
        self.print_mongo
    }

    pub fn print_logstash(&self) -> bool {
        self.print_logstash
    }
}
