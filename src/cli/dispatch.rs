use anyhow::Result;

use super::config::cmd_show_config;
use super::env::CliArgs;
use super::policy::cmd_check_policy;
use super::simulate::cmd_simulate;
use crate::cli::commands::Commands;
use crate::config::GatewayConfig;

pub async fn dispatch(cli: &CliArgs, config: GatewayConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::CheckPolicy(args) => cmd_check_policy(args, &cli.output),
        Commands::Simulate(args) => cmd_simulate(args, config, &cli.output).await,
        Commands::ShowConfig(args) => cmd_show_config(args, &config, &cli.output),
    }
}
