//! `gsa insert`, `gsa update`, `gsa delete`.

use gsa_api::{Entry, GsaClient};
use tracing::info;

use crate::cli::{DeleteArgs, GlobalOpts, InsertArgs, OutputFormat, UpdateArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn load_entry(path: &std::path::Path) -> Result<Entry, CliError> {
    let doc = util::read_input(path)?;
    Entry::from_xml(&doc).map_err(|e| CliError::Validation {
        field: "input".into(),
        reason: e.to_string(),
    })
}

pub async fn insert(
    client: &GsaClient,
    args: InsertArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let entry = load_entry(&args.input)?;
    let created = client.insert_entry(&args.feed, &entry).await?;
    info!(feed = %args.feed, id = ?created.id, "inserted entry");
    output::print_output(&output::render_entry(format, &created)?, global.quiet);
    Ok(())
}

pub async fn update(
    client: &GsaClient,
    args: UpdateArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let entry = load_entry(&args.input)?;
    let updated = client.update_entry(&args.feed, &args.entry, &entry).await?;
    info!(feed = %args.feed, entry = %args.entry, "updated entry");
    output::print_output(&output::render_entry(format, &updated)?, global.quiet);
    Ok(())
}

pub async fn delete(
    client: &GsaClient,
    args: DeleteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let prompt = format!("Delete '{}' from {}?", args.entry, args.feed);
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }
    client.delete_entry(&args.feed, &args.entry).await?;
    if !global.quiet {
        eprintln!("Deleted '{}' from {}", args.entry, args.feed);
    }
    Ok(())
}
