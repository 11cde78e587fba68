use super::{mismatch, parse_json, Interceptor};
use crate::errors::InterceptError;
use crate::kind::{ExecutionPoint, InterceptorKind};
use crate::params::ParameterBag;
use crate::policy::{IpListPolicy, Policy};
use crate::spec::InterceptorSpec;
use std::net::IpAddr;

pub const TEMPLATE_BLACKLIST: &str = "blacklist.mustache";
pub const TEMPLATE_WHITELIST: &str = "whitelist.mustache";

#[derive(Clone, Copy, Debug, Default)]
pub struct BlacklistInterceptor;

#[derive(Clone, Copy, Debug, Default)]
pub struct WhitelistInterceptor;

fn parse_ips(raw: &str, kind: InterceptorKind, template: &str) -> Result<IpListPolicy, InterceptError> {
    let policy: IpListPolicy = parse_json(raw, kind, template)?;
    if policy.ips.is_empty() {
        return Err(InterceptError::invalid_content(kind, template, "ips must not be empty"));
    }
    if let Some(bad) = policy.ips.iter().find(|ip| ip.trim().parse::<IpAddr>().is_err()) {
        return Err(InterceptError::invalid_content(
            kind,
            template,
            format!("{bad} is not an IP address"),
        ));
    }
    Ok(policy)
}

fn bind_ips(policy: &IpListPolicy, mut params: ParameterBag) -> ParameterBag {
    let ips: Vec<&str> = policy.ips.iter().map(|ip| ip.trim()).collect();
    params.insert("ips", ips.join(","));
    params
}

impl Interceptor for BlacklistInterceptor {
    fn kind(&self) -> InterceptorKind {
        InterceptorKind::Blacklist
    }

    fn template_file(&self, _point: ExecutionPoint) -> &'static str {
        TEMPLATE_BLACKLIST
    }

    fn parse_content(&self, raw: &str, _point: ExecutionPoint) -> Result<Policy, InterceptError> {
        parse_ips(raw, self.kind(), TEMPLATE_BLACKLIST).map(Policy::Blacklist)
    }

    fn build_parameters(
        &self,
        policy: &Policy,
        params: ParameterBag,
        _spec: &InterceptorSpec,
    ) -> Result<ParameterBag, InterceptError> {
        match policy {
            Policy::Blacklist(ips) => Ok(bind_ips(ips, params)),
            other => Err(mismatch(self.kind(), TEMPLATE_BLACKLIST, other)),
        }
    }
}

impl Interceptor for WhitelistInterceptor {
    fn kind(&self) -> InterceptorKind {
        InterceptorKind::Whitelist
    }

    fn template_file(&self, _point: ExecutionPoint) -> &'static str {
        TEMPLATE_WHITELIST
    }

    fn parse_content(&self, raw: &str, _point: ExecutionPoint) -> Result<Policy, InterceptError> {
        parse_ips(raw, self.kind(), TEMPLATE_WHITELIST).map(Policy::Whitelist)
    }

    fn build_parameters(
        &self,
        policy: &Policy,
        params: ParameterBag,
        _spec: &InterceptorSpec,
    ) -> Result<ParameterBag, InterceptError> {
        match policy {
            Policy::Whitelist(ips) => Ok(bind_ips(ips, params)),
            other => Err(mismatch(self.kind(), TEMPLATE_WHITELIST, other)),
        }
    }
}
