use anyhow::{Context, Result};
use clap::Args;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use gatehouse_trace::InboundCall;

use super::output::{print_structured, OutputFormat};
use crate::config::GatewayConfig;
use crate::pipeline::Gateway;

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// API id to call
    #[arg(long)]
    pub api: String,

    /// Number of calls to run
    #[arg(long, default_value_t = 1)]
    pub calls: usize,

    /// Request path
    #[arg(long, default_value = "/")]
    pub path: String,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Value of the client_id header
    #[arg(long)]
    pub client: Option<String>,

    /// Value of the access_token header
    #[arg(long)]
    pub access_token: Option<String>,

    /// X-Forwarded-For values, in header order
    #[arg(long = "forwarded-for")]
    pub forwarded_for: Vec<String>,

    /// Calls in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

#[derive(Debug, Serialize)]
struct CallLine {
    seq: usize,
    status: u16,
    unit: String,
    call_id: String,
    retry_after: Option<String>,
}

pub async fn cmd_simulate(
    args: SimulateArgs,
    config: GatewayConfig,
    output: &OutputFormat,
) -> Result<()> {
    let gateway = Gateway::builder(config)
        .build()
        .context("Failed to build gateway")?;
    let url = format!("http://gatehouse.local{}", args.path);

    let template = build_call(&args, &url);
    let lines: Vec<CallLine> = stream::iter(1..=args.calls)
        .map(|seq| {
            let gateway = &gateway;
            let call = template.clone();
            let api = args.api.as_str();
            async move {
                let reply = gateway.handle(api, call).await?;
                Ok::<_, anyhow::Error>(CallLine {
                    seq,
                    status: reply.status(),
                    unit: reply.unit.to_string(),
                    retry_after: reply.response.header("retry-after").map(str::to_string),
                    call_id: reply.call_id,
                })
            }
        })
        .buffered(args.concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_>>()?;

    if print_structured(output, &lines)? {
        return Ok(());
    }
    for line in &lines {
        match &line.retry_after {
            Some(secs) => println!(
                "#{:<4} {} {} (retry after {secs}s)",
                line.seq, line.status, line.unit
            ),
            None => println!("#{:<4} {} {}", line.seq, line.status, line.unit),
        }
    }
    Ok(())
}

fn build_call(args: &SimulateArgs, url: &str) -> InboundCall {
    let mut call = InboundCall::new(args.method.to_ascii_uppercase(), url);
    if let Some(client) = &args.client {
        call.add_header(gatehouse_trace::request::CLIENT_ID, client.as_str());
    }
    if let Some(token) = &args.access_token {
        call.add_header(gatehouse_trace::request::ACCESS_TOKEN, token.as_str());
    }
    for addr in &args.forwarded_for {
        call.add_header(gatehouse_trace::request::FORWARDED_FOR, addr.as_str());
    }
    call
}
