//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod bandwidth;
pub mod config_cmd;
pub mod ftp;
pub mod mail;
pub mod overview;
pub mod scan;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Ftp(args) => ftp::handle(args, global).await,
        Command::Mail(args) => mail::handle(args, global).await,
        Command::Scan(args) => scan::handle(args, global).await,
        Command::Bandwidth(args) => bandwidth::handle(args, global).await,
        Command::Overview => overview::handle(global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
