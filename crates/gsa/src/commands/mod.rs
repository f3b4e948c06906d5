//! Command dispatch: bridges CLI args -> feed client calls -> output formatting.

pub mod acl;
pub mod config_cmd;
pub mod entries;
pub mod fleet;
pub mod monitor;
pub mod retrieve;
pub mod util;

use gsa_api::GsaClient;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Dispatch a command that works against one connected appliance.
pub async fn dispatch(
    cmd: Command,
    client: &GsaClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::Retrieve(args) => retrieve::handle(client, args, global, format).await,
        Command::Insert(args) => entries::insert(client, args, global, format).await,
        Command::Update(args) => entries::update(client, args, global, format).await,
        Command::Delete(args) => entries::delete(client, args, global).await,
        Command::Acl(args) => acl::handle(client, args, global, format).await,
        // These open their own sessions, or none at all
        Command::Monitor(_)
        | Command::Crawl(_)
        | Command::Index(_)
        | Command::DocLimit(_)
        | Command::Config(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not an appliance command".into(),
        }),
    }
}
