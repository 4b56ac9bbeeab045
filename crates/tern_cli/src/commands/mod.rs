//! Command dispatch.

pub mod chat;
pub mod slash;
pub mod toolbus;

use crate::cli::{Cli, Command};
use anyhow::Result;

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Command::Chat) => chat::handle(cli.session).await,
        Some(Command::Toolbus { action }) => toolbus::handle(action, &cli.session).await,
    }
}
