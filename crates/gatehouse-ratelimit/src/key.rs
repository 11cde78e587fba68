use serde::{Deserialize, Serialize};
use std::fmt;

/// Quota bucket: one per (policy, caller) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitKey {
    pub policy_id: String,
    pub caller: String,
}

impl RateLimitKey {
    pub fn new(policy_id: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            caller: caller.into(),
        }
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.policy_id, self.caller)
    }
}
