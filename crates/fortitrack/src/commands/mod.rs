//! Command dispatch: bridges CLI args -> reconciler -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod status;
pub mod util;
pub mod watch;

use fortitrack_core::FirewallConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a firewall-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    firewall: FirewallConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(args, &firewall, global).await,
        Command::Watch(args) => watch::handle(args, &firewall, global).await,
        Command::Status => status::handle(&firewall, global).await,
        // Handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
