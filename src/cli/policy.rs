use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use gatehouse_interceptors::prelude::*;

use super::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct CheckPolicyArgs {
    /// Interceptor kind (RATTING, MOCK, BLACKLIST, WHITELIST, LOG)
    #[arg(long)]
    pub kind: String,

    /// Raw interceptor content as JSON
    #[arg(long)]
    pub content: String,

    /// Execution point the interceptor is attached to
    #[arg(long, default_value = "REQUEST")]
    pub point: String,
}

pub fn cmd_check_policy(args: CheckPolicyArgs, output: &OutputFormat) -> Result<()> {
    let kind: InterceptorKind = args.kind.parse().map_err(anyhow::Error::msg)?;
    let point: ExecutionPoint = serde_json::from_value(json!(args.point.to_ascii_uppercase()))
        .with_context(|| format!("Unknown execution point {}", args.point))?;
    let spec = InterceptorSpec::new("cli", "cli", kind, point, args.content);

    let registry = InterceptorRegistry::builtin();
    let prepared = registry
        .prepare(&spec, &CallScope::new("cli", "cli"))
        .context("Interceptor content rejected")?;

    if print_structured(output, &prepared)? {
        return Ok(());
    }
    println!("Kind     → {}", prepared.kind);
    println!("Template → {}", prepared.template);
    println!("Parameters:");
    for (name, value) in prepared.params.iter() {
        println!("  {name} = {value}");
    }
    Ok(())
}
