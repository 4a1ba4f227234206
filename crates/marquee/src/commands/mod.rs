//! Command dispatch: bridges CLI args -> backend calls -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod photo;
pub mod theaters;
pub mod util;

use marquee_core::Backend;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(args, backend, global).await,
        Command::Theaters(args) => theaters::handle(args, backend, global).await,
        Command::Photo => photo::handle(backend, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
