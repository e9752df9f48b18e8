//! Command handlers.

pub mod apps;
pub mod clients;
pub mod config_cmd;

use wlcdash_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a controller-backed command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login => {
            controller.login().await?;
            if !global.quiet {
                let session = controller.session();
                eprintln!("Logged in to {} as {}", session.base_url(), session.username());
            }
            Ok(())
        }
        Command::Clients(args) => clients::handle(controller, args, global).await,
        Command::Apps(args) => apps::handle(controller, args, global).await,
        // Handled before a controller is built
        Command::Config(_) => Ok(()),
    }
}
