//! Command handlers.

pub mod devices;
pub mod migrate;
pub mod refresh;
pub mod staging;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::ResolvedProfile;
use crate::error::CliError;

pub async fn dispatch(
    command: Command,
    resolved: ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Devices(args) => devices::handle(resolved, args, global).await,
        Command::Refresh(args) => refresh::handle(resolved, args, global).await,
        Command::Migrate(args) => migrate::handle(resolved, args, global).await,
        Command::Staging(args) => staging::handle(resolved, args, global).await,
        Command::Completions(_) => unreachable!("handled before profile resolution"),
    }
}
