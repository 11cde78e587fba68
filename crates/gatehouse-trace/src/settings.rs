use serde::{Deserialize, Serialize};

/// Logging switches and labels copied into every trace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Write the full JSON dump to the primary sink instead of the one-line summary.
    pub print_all_trace: bool,
    pub print_mongo: bool,
    pub print_logstash: bool,
    pub profile: Option<String>,
    pub version: Option<String>,
}
