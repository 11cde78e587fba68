use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterceptorKind {
    /// Calls-per-interval quota.
    Ratting,
    Mock,
    Blacklist,
    Whitelist,
    Log,
}

impl InterceptorKind {
    pub const ALL: [InterceptorKind; 5] = [
        InterceptorKind::Ratting,
        InterceptorKind::Mock,
        InterceptorKind::Blacklist,
        InterceptorKind::Whitelist,
        InterceptorKind::Log,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            InterceptorKind::Ratting => "RATTING",
            InterceptorKind::Mock => "MOCK",
            InterceptorKind::Blacklist => "BLACKLIST",
            InterceptorKind::Whitelist => "WHITELIST",
            InterceptorKind::Log => "LOG",
        }
    }
}

impl fmt::Display for InterceptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterceptorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown interceptor kind: {s}"))
    }
}

/// When an interceptor runs relative to the upstream call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionPoint {
    #[serde(alias = "FIRST")]
    Request,
    #[serde(alias = "SECOND")]
    Response,
}

impl ExecutionPoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionPoint::Request => "REQUEST",
            ExecutionPoint::Response => "RESPONSE",
        }
    }
}

impl fmt::Display for ExecutionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("ratting".parse::<InterceptorKind>().unwrap(), InterceptorKind::Ratting);
        assert_eq!("LOG".parse::<InterceptorKind>().unwrap(), InterceptorKind::Log);
        assert!("OAUTH".parse::<InterceptorKind>().is_err());
    }

    #[test]
    fn execution_point_wire_names() {
        let point: ExecutionPoint = serde_json::from_str("\"FIRST\"").unwrap();
        assert_eq!(point, ExecutionPoint::Request);
        assert_eq!(serde_json::to_string(&ExecutionPoint::Response).unwrap(), "\"RESPONSE\"");
    }
}
