use serde::Serialize;
use std::fmt;

/// Log level a finished call is reported at.
///
/// Only three buckets exist:
///   * 1xx~2xx = INFO
///   * 3xx~4xx = WARN
///   * OTHER   = ERROR
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogTier {
    Info,
    Warn,
    Error,
}

impl LogTier {
    pub const fn from_status(status: u16) -> Self {
        match status {
            100..=299 => LogTier::Info,
            300..=499 => LogTier::Warn,
            _ => LogTier::Error,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LogTier::Info => "INFO",
            LogTier::Warn => "WARN",
            LogTier::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
