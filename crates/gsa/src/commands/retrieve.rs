//! `gsa retrieve`: feeds and entries, with optional query parameters.

use gsa_api::GsaClient;
use indexmap::IndexMap;

use crate::cli::{GlobalOpts, OutputFormat, RetrieveArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &GsaClient,
    args: RetrieveArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    // Insertion order is the order the flags were given in.
    let query: IndexMap<String, String> = args.query.into_iter().collect();

    let out = match args.entry {
        Some(ref entry) => {
            let entry = if query.is_empty() {
                client.get_entry(&args.feed, entry).await?
            } else {
                client.query_entry(&args.feed, entry, &query).await?
            };
            output::render_entry(format, &entry)?
        }
        None => {
            let feed = if query.is_empty() {
                client.get_feed(&args.feed).await?
            } else {
                client.query_feed(&args.feed, &query).await?
            };
            output::render_feed(format, &feed)?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
