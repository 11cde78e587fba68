use clap::Subcommand;

use super::config::ShowConfigArgs;
use super::policy::CheckPolicyArgs;
use super::simulate::SimulateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Parse interceptor content and print the template parameters it binds
    CheckPolicy(CheckPolicyArgs),

    /// Run calls through the full pipeline against the static upstream
    Simulate(SimulateArgs),

    /// Print the effective configuration after file and environment overlays
    ShowConfig(ShowConfigArgs),
}
