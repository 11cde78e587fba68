use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Length of one rate-limit window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "SECOND", alias = "SECONDS")]
    Second,
    #[serde(rename = "MINUTE", alias = "MINUTES")]
    Minute,
    #[serde(rename = "HOUR", alias = "HOURS")]
    Hour,
    #[serde(rename = "DAY", alias = "DAYS")]
    Day,
}

impl Interval {
    /// Symbolic name as consumed by policy templates.
    pub const fn name(self) -> &'static str {
        match self {
            Interval::Second => "SECOND",
            Interval::Minute => "MINUTE",
            Interval::Hour => "HOUR",
            Interval::Day => "DAY",
        }
    }

    pub const fn duration(self) -> Duration {
        match self {
            Interval::Second => Duration::from_secs(1),
            Interval::Minute => Duration::from_secs(60),
            Interval::Hour => Duration::from_secs(60 * 60),
            Interval::Day => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts exactly the names policy content may carry: the canonical
/// uppercase form and its plural alias.
impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SECOND" | "SECONDS" => Ok(Interval::Second),
            "MINUTE" | "MINUTES" => Ok(Interval::Minute),
            "HOUR" | "HOURS" => Ok(Interval::Hour),
            "DAY" | "DAYS" => Ok(Interval::Day),
            other => Err(format!("unknown interval: {other}")),
        }
    }
}
