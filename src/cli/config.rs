use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::config::GatewayConfig;

use super::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ShowConfigArgs {
    /// Include build metadata
    #[arg(long)]
    pub build: bool,
}

pub fn cmd_show_config(
    args: ShowConfigArgs,
    config: &GatewayConfig,
    output: &OutputFormat,
) -> Result<()> {
    let payload = if args.build {
        json!({
            "build": {
                "version": crate::build_version(),
                "date": env!("BUILD_DATE"),
                "git_hash": env!("GIT_HASH"),
            },
            "config": config,
        })
    } else {
        serde_json::to_value(config)?
    };

    if !print_structured(output, &payload)? {
        // Human output is YAML, the same shape the config file takes.
        print!("{}", serde_yaml::to_string(&payload)?);
    }
    Ok(())
}
