use gatehouse_ratelimit::Interval;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Calls allowed per interval for one caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitPolicy {
    pub calls: u64,
    pub interval: Interval,
}

/// Canned response returned instead of calling the upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockPolicy {
    pub status: u16,
    #[serde(default)]
    pub body: Value,
}

/// Addresses a blacklist rejects or a whitelist admits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpListPolicy {
    pub ips: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogPolicy {
    #[serde(default)]
    pub message: Option<String>,
}

/// A parsed interceptor content, one variant per interceptor kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Policy {
    Ratting(RateLimitPolicy),
    Mock(MockPolicy),
    Blacklist(IpListPolicy),
    Whitelist(IpListPolicy),
    Log(LogPolicy),
}
