//! Command dispatch: bridges CLI args -> engine and stores -> output formatting.

pub mod acl;
pub mod config_cmd;
pub mod devices;
pub mod policies;
pub mod profiles;
pub mod util;
pub mod validate;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;

/// Dispatch a data-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let store = config::open_store(cfg)?;
    match cmd {
        Command::Validate(args) => validate::handle(store, cfg, args, global).await,
        Command::Devices(args) => devices::handle(&store, args, global),
        Command::Policies(args) => policies::handle(&store, args, global),
        Command::Profiles(args) => profiles::handle(&store, args, global),
        // Handled before dispatch
        Command::Acl(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
