#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    InvalidContent,
    UnknownInterceptor,
    ContextMissing,
    RateLimit,
    PolicyDeny,
    Observe,
    Timeout,
    Upstream,
    Config,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidContent => "InvalidContent",
            ErrorKind::UnknownInterceptor => "UnknownInterceptor",
            ErrorKind::ContextMissing => "ContextMissing",
            ErrorKind::RateLimit => "RateLimit",
            ErrorKind::PolicyDeny => "PolicyDeny",
            ErrorKind::Observe => "Observe",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Upstream => "Upstream",
            ErrorKind::Config => "Config",
            ErrorKind::Unknown => "Unknown",
        }
    }
}
