// One refresh cycle for one row.
//
// Each feed named by a remote column is fetched at most once per cycle;
// its entries are indexed by `entryID` so later columns on the same feed
// are answered from the cycle-local cache.

use std::collections::HashMap;

use gsa_api::terms::properties;
use gsa_api::{Entry, GsaClient};
use tracing::debug;

use crate::column::{ColumnSource, ColumnSpec, ColumnValue};
use crate::error::CoreError;

/// Fetch and coerce every remote column for one appliance.
///
/// The result is aligned with `columns`: local columns yield `None`, as do
/// remote columns whose entry or property the appliance did not return.
/// The first failure aborts the cycle.
pub async fn refresh_row(
    client: &GsaClient,
    columns: &[ColumnSpec],
) -> Result<Vec<Option<ColumnValue>>, CoreError> {
    let mut cache: HashMap<&str, HashMap<String, Entry>> = HashMap::new();
    let mut values = Vec::with_capacity(columns.len());

    for spec in columns {
        let ColumnSource::Remote {
            feed,
            entry,
            property,
        } = &spec.source
        else {
            values.push(None);
            continue;
        };

        if !cache.contains_key(feed.as_str()) {
            debug!(address = %client.address(), feed = %feed, "fetching feed");
            let fetched = client.get_feed(feed).await?;
            cache.insert(feed.as_str(), index_by_entry_id(fetched));
        }

        let raw = cache
            .get(feed.as_str())
            .and_then(|entries| entries.get(entry))
            .and_then(|e| e.get(property));
        let value = match raw {
            Some(raw) => Some(spec.coerce(&raw)?),
            None => None,
        };
        values.push(value);
    }

    Ok(values)
}

fn index_by_entry_id(feed: gsa_api::Feed) -> HashMap<String, Entry> {
    feed.into_iter()
        .filter_map(|entry| entry.get(properties::ENTRY_ID).map(|id| (id, entry)))
        .collect()
}
