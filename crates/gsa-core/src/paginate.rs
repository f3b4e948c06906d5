// ── Feed pagination ──
//
// Line-windowed listing for feeds that cap their page size, such as
// `policyAcls`. Pages are requested until one comes back empty.

use gsa_api::terms::queries;
use gsa_api::{Entry, GsaClient};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::CoreError;

/// Largest page the appliance serves for line-windowed feeds.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Collect every entry of `feed` by querying `maxLines`/`startLine`
/// windows of `page_size` entries.
///
/// The loop ends on the first page with zero entries, so a feed holding
/// an exact multiple of `page_size` entries costs one extra request.
pub async fn fetch_all(
    client: &GsaClient,
    feed: &str,
    page_size: usize,
) -> Result<Vec<Entry>, CoreError> {
    let page_size = page_size.max(1);
    let mut all = Vec::new();
    let mut start_line: usize = 0;
    let mut query = IndexMap::new();
    query.insert(queries::MAX_LINES.to_owned(), page_size.to_string());

    loop {
        query.insert(queries::START_LINE.to_owned(), start_line.to_string());
        let page = client.query_feed(feed, &query).await?;
        let received = page.len();
        debug!(feed, start_line, received, "fetched page");
        if received == 0 {
            break;
        }
        all.extend(page);
        start_line += page_size;
    }

    Ok(all)
}
