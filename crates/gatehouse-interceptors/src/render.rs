use crate::errors::InterceptError;
use crate::params::{self, ParameterBag};
use crate::response::GatewayResponse;
use crate::variants::ip_list::{TEMPLATE_BLACKLIST, TEMPLATE_WHITELIST};
use crate::variants::log::{TEMPLATE_LOG_REQUEST, TEMPLATE_LOG_RESPONSE};
use crate::variants::mock::TEMPLATE_MOCK;
use crate::variants::ratting::TEMPLATE_RATTING;
use async_trait::async_trait;
use gatehouse_ratelimit::prelude::*;
use gatehouse_trace::{InboundCall, UnitId};
use serde_json::{json, Value};
use tracing::{debug, info};

pub const ANONYMOUS: &str = "anonymous";

/// What a policy check may look at.
#[derive(Clone, Copy, Debug)]
pub struct CallView<'a> {
    pub unit: UnitId,
    pub call: &'a InboundCall,
    /// Upstream status, once there is one.
    pub response_status: Option<u16>,
}

impl<'a> CallView<'a> {
    pub fn new(unit: UnitId, call: &'a InboundCall) -> Self {
        Self {
            unit,
            call,
            response_status: None,
        }
    }

    pub fn with_response_status(mut self, status: u16) -> Self {
        self.response_status = Some(status);
        self
    }

    /// Identity quotas are counted against: client id, else access token,
    /// else the forwarded address list, else `anonymous`.
    pub fn caller(&self) -> String {
        self.call
            .client_id()
            .map(str::to_string)
            .or_else(|| self.call.access_token().map(str::to_string))
            .or_else(|| self.call.forwarded_for())
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    /// Originating client address: first entry of the forwarded list.
    pub fn client_address(&self) -> Option<String> {
        let forwarded = self.call.forwarded_for()?;
        forwarded
            .split(',')
            .map(str::trim)
            .find(|addr| !addr.is_empty())
            .map(str::to_string)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Let the call continue.
    Admit { detail: Option<Value> },
    /// Refuse the call with `response`.
    Reject {
        response: GatewayResponse,
        detail: Option<Value>,
    },
    /// Answer the call with `response` without it counting as a refusal.
    Respond {
        response: GatewayResponse,
        detail: Option<Value>,
    },
}

/// Executable form of a rendered interceptor.
#[async_trait]
pub trait PolicyCheck: Send + Sync {
    async fn evaluate(&self, call: &CallView<'_>) -> Result<Verdict, InterceptError>;
}

/// Turns a template plus its parameters into a [`PolicyCheck`].
pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        template_id: &str,
        params: &ParameterBag,
    ) -> Result<Box<dyn PolicyCheck>, InterceptError>;
}

/// Renders the built-in templates into in-process checks.
#[derive(Clone)]
pub struct NativeRenderer {
    limiter: RateLimiter,
}

impl NativeRenderer {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl TemplateRenderer for NativeRenderer {
    fn render(
        &self,
        template_id: &str,
        params: &ParameterBag,
    ) -> Result<Box<dyn PolicyCheck>, InterceptError> {
        let check: Box<dyn PolicyCheck> = match template_id {
            TEMPLATE_RATTING => {
                let interval: Interval = require_str(template_id, params, "interval")?
                    .parse()
                    .map_err(|err: String| InterceptError::render(template_id, err))?;
                Box::new(RateLimitCheck {
                    limiter: self.limiter.clone(),
                    policy_id: require_str(template_id, params, params::INTERCEPTOR_ID)?.to_string(),
                    calls: require_u64(template_id, params, "calls")?,
                    interval,
                })
            }
            TEMPLATE_MOCK => {
                let status = require_u64(template_id, params, "status")?;
                let status = u16::try_from(status)
                    .map_err(|_| InterceptError::render(template_id, "status out of range"))?;
                Box::new(MockCheck {
                    status,
                    body: params.get("body").cloned().unwrap_or(Value::Null),
                })
            }
            TEMPLATE_BLACKLIST | TEMPLATE_WHITELIST => Box::new(IpListCheck {
                allow_listed: template_id == TEMPLATE_WHITELIST,
                ips: require_str(template_id, params, "ips")?
                    .split(',')
                    .map(|ip| ip.trim().to_string())
                    .filter(|ip| !ip.is_empty())
                    .collect(),
            }),
            TEMPLATE_LOG_REQUEST | TEMPLATE_LOG_RESPONSE => Box::new(LogCheck {
                name: require_str(template_id, params, params::NAME)?.to_string(),
                message: params.get_str("message").unwrap_or_default().to_string(),
                execution_point: require_str(template_id, params, "execution_point")?.to_string(),
            }),
            other => {
                return Err(InterceptError::render(
                    other,
                    format!("no native check for template {other}"),
                ))
            }
        };
        Ok(check)
    }
}

fn require_str<'p>(
    template: &str,
    params: &'p ParameterBag,
    name: &str,
) -> Result<&'p str, InterceptError> {
    params
        .get_str(name)
        .ok_or_else(|| InterceptError::render(template, format!("missing string parameter {name}")))
}

fn require_u64(template: &str, params: &ParameterBag, name: &str) -> Result<u64, InterceptError> {
    params
        .get_u64(name)
        .ok_or_else(|| InterceptError::render(template, format!("missing integer parameter {name}")))
}

struct RateLimitCheck {
    limiter: RateLimiter,
    policy_id: String,
    calls: u64,
    interval: Interval,
}

#[async_trait]
impl PolicyCheck for RateLimitCheck {
    async fn evaluate(&self, call: &CallView<'_>) -> Result<Verdict, InterceptError> {
        let key = RateLimitKey::new(self.policy_id.as_str(), call.caller());
        let decision = self
            .limiter
            .check(&key, self.calls, self.interval.duration())
            .await?;
        match decision {
            Decision::Allowed { remaining } => Ok(Verdict::Admit {
                detail: Some(json!({ "remaining": remaining })),
            }),
            Decision::Denied { .. } => {
                let secs = decision.retry_after_secs().unwrap_or(1);
                let response = GatewayResponse::from_error(&InterceptError::rate_limited(secs));
                Ok(Verdict::Reject {
                    response,
                    detail: Some(json!({
                        "calls": self.calls,
                        "interval": self.interval.name(),
                        "retry_after_secs": secs,
                    })),
                })
            }
        }
    }
}

struct MockCheck {
    status: u16,
    body: Value,
}

#[async_trait]
impl PolicyCheck for MockCheck {
    async fn evaluate(&self, _call: &CallView<'_>) -> Result<Verdict, InterceptError> {
        Ok(Verdict::Respond {
            response: GatewayResponse::new(self.status, self.body.clone()),
            detail: Some(json!({ "mocked": self.status })),
        })
    }
}

struct IpListCheck {
    allow_listed: bool,
    ips: Vec<String>,
}

#[async_trait]
impl PolicyCheck for IpListCheck {
    async fn evaluate(&self, call: &CallView<'_>) -> Result<Verdict, InterceptError> {
        let address = call.client_address();
        let listed = address
            .as_deref()
            .is_some_and(|addr| self.ips.iter().any(|ip| ip == addr));
        if listed == self.allow_listed {
            return Ok(Verdict::Admit { detail: None });
        }
        let reason = match (&address, self.allow_listed) {
            (None, _) => "client address unknown".to_string(),
            (Some(addr), true) => format!("{addr} is not whitelisted"),
            (Some(addr), false) => format!("{addr} is blacklisted"),
        };
        debug!(%reason, "ip list rejected call");
        Ok(Verdict::Reject {
            response: GatewayResponse::from_error(&InterceptError::deny_policy(&reason)),
            detail: Some(json!({ "address": address, "reason": reason })),
        })
    }
}

struct LogCheck {
    name: String,
    message: String,
    execution_point: String,
}

#[async_trait]
impl PolicyCheck for LogCheck {
    async fn evaluate(&self, call: &CallView<'_>) -> Result<Verdict, InterceptError> {
        info!(
            target: "gatehouse::intercept",
            interceptor = %self.name,
            point = %self.execution_point,
            method = %call.call.method,
            url = %call.call.url,
            status = ?call.response_status,
            "{}",
            self.message
        );
        Ok(Verdict::Admit {
            detail: Some(json!({
                "message": self.message,
                "execution_point": self.execution_point,
                "status": call.response_status,
            })),
        })
    }
}
