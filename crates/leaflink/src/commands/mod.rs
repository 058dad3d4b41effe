//! Command dispatch: bridges CLI args -> core operations -> output.

pub mod auth;
pub mod config_cmd;
pub mod pair;
pub mod plants;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(args, global).await,
        Command::Logout => auth::logout(global),
        Command::Whoami => auth::whoami(global).await,
        Command::Plants => plants::handle(global).await,
        Command::Watch(args) => watch::handle(&args, global).await,
        Command::Pair(args) => pair::handle(&args, global).await,
        Command::Join(args) => pair::join(&args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
