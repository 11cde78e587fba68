use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use url::Url;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const CLIENT_ID: &str = "client_id";
pub const ACCESS_TOKEN: &str = "access_token";

/// Origin that origin-form targets (`/v1/orders?page=2`) are resolved against.
const RELATIVE_BASE: &str = "http://gatehouse.invalid/";

/// The parts of an inbound HTTP request the gateway core looks at.
///
/// Header names are stored lowercased; repeated headers keep every value in
/// arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundCall {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
}

impl InboundCall {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// All `X-Forwarded-For` entries joined with `,`, or `None` when the
    /// header is absent.
    pub fn forwarded_for(&self) -> Option<String> {
        let values = self.header_values(FORWARDED_FOR);
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.header(CLIENT_ID).filter(|v| !v.is_empty())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.header(ACCESS_TOKEN).filter(|v| !v.is_empty())
    }

    /// Path of the request target, without query or fragment. A target
    /// that does not parse as a URL is returned unchanged.
    pub fn path(&self) -> String {
        let parsed = match Url::parse(&self.url) {
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(RELATIVE_BASE).and_then(|base| base.join(&self.url))
            }
            other => other,
        };
        match parsed {
            Ok(url) => url.path().to_string(),
            Err(err) => {
                warn!(url = %self.url, error = %err, "request target is not a valid URL");
                self.url.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_keeps_header_order() {
        let call = InboundCall::new("GET", "http://gw/v1/orders")
            .with_header("X-Forwarded-For", "1.2.3.4")
            .with_header("x-forwarded-for", "5.6.7.8");
        assert_eq!(call.forwarded_for().as_deref(), Some("1.2.3.4,5.6.7.8"));
    }

    #[test]
    fn forwarded_for_absent() {
        let call = InboundCall::new("GET", "/v1/orders");
        assert_eq!(call.forwarded_for(), None);
        assert_eq!(call.client_id(), None);
    }

    #[test]
    fn path_strips_scheme_host_and_query() {
        assert_eq!(
            InboundCall::new("GET", "https://gw.local:8080/v1/orders?page=2").path(),
            "/v1/orders"
        );
        assert_eq!(InboundCall::new("GET", "/v1/orders?x=1").path(), "/v1/orders");
        assert_eq!(InboundCall::new("GET", "http://gw.local").path(), "/");
    }

    #[test]
    fn path_drops_fragments() {
        assert_eq!(InboundCall::new("GET", "http://gw.local/health#top").path(), "/health");
        assert_eq!(InboundCall::new("GET", "/health?verbose=1#top").path(), "/health");
        assert_eq!(InboundCall::new("GET", "/orders/17").path(), "/orders/17");
    }
}
