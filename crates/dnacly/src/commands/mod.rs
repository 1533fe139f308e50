//! Command dispatch: bridges CLI args -> core workflows -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod credentials;
pub mod inventory;
pub mod pnp;
pub mod sites;
pub mod swim;
pub mod tags;
pub mod templates;
pub mod util;

use dnacly_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs an authenticated session.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Inventory(args) => inventory::handle(session, args, global).await,
        Command::Sites(args) => sites::handle(session, args, global).await,
        Command::Tags(args) => tags::handle(session, args, global).await,
        Command::Credentials(args) => credentials::handle(session, args, global).await,
        Command::Templates(args) => templates::handle(session, args, global).await,
        Command::Pnp(args) => pnp::handle(session, args, global).await,
        Command::Swim(args) => swim::handle(session, args, global).await,
        // Handled before a session is connected
        Command::Auth(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
