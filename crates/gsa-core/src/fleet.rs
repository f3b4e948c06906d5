// ── Fleet commands ──
//
// Crawl and index controls applied to several appliances in turn. Each
// command is one entry update. A failure on one appliance is logged and
// recorded; the remaining appliances still get the command.

use std::fmt;

use gsa_api::terms::{entries, feeds, properties};
use gsa_api::{Entry, GsaClient};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FleetCommand {
    PauseCrawl,
    ResumeCrawl,
    ResetIndex,
    SetDocLimit { max_urls: u64 },
}

impl FleetCommand {
    /// Feed and entry the command writes to.
    pub fn target(self) -> (&'static str, &'static str) {
        match self {
            Self::PauseCrawl | Self::ResumeCrawl => (feeds::COMMAND, entries::PAUSE_CRAWL),
            Self::ResetIndex => (feeds::COMMAND, entries::RESET_INDEX),
            Self::SetDocLimit { .. } => (feeds::CONFIG, entries::HOST_LOAD),
        }
    }

    /// The update sent to `client`, id pointing at the target entry.
    pub fn to_entry(self, client: &GsaClient) -> Entry {
        let (feed, entry_id) = self.target();
        let mut entry = match self {
            Self::PauseCrawl => Entry::new().with(properties::PAUSE_CRAWL, "1"),
            Self::ResumeCrawl => Entry::new().with(properties::PAUSE_CRAWL, "0"),
            Self::ResetIndex => Entry::new().with(properties::RESET_INDEX, "1"),
            Self::SetDocLimit { max_urls } => {
                Entry::new().with(properties::MAX_URLS, &max_urls.to_string())
            }
        };
        entry.id = Some(format!("{}/{feed}/{entry_id}", client.base_url()));
        entry
    }
}

impl fmt::Display for FleetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PauseCrawl => f.write_str("pause crawl"),
            Self::ResumeCrawl => f.write_str("resume crawl"),
            Self::ResetIndex => f.write_str("reset index"),
            Self::SetDocLimit { max_urls } => write!(f, "set doc limit to {max_urls}"),
        }
    }
}

/// An appliance the command did not reach or that refused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetFailure {
    pub address: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetReport {
    /// Addresses that accepted the command.
    pub applied: Vec<String>,
    pub failed: Vec<FleetFailure>,
}

impl FleetReport {
    pub fn record_failure(&mut self, address: String, reason: impl fmt::Display) {
        self.failed.push(FleetFailure {
            address,
            reason: reason.to_string(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send `command` to each client in order, continuing past failures.
pub async fn apply<'a>(
    clients: impl IntoIterator<Item = &'a GsaClient>,
    command: FleetCommand,
) -> FleetReport {
    let (feed, entry_id) = command.target();
    let mut report = FleetReport::default();
    for client in clients {
        let address = client.address();
        match client
            .update_entry(feed, entry_id, &command.to_entry(client))
            .await
        {
            Ok(_) => {
                info!(address = %address, %command, "command applied");
                report.applied.push(address);
            }
            Err(e) => {
                warn!(address = %address, %command, error = %e, "command failed");
                report.record_failure(address, e);
            }
        }
    }
    report
}

/// Log in to every appliance concurrently. Results are returned in input
/// order.
pub async fn connect_all(
    connections: &[ConnectionConfig],
) -> Vec<(String, Result<GsaClient, CoreError>)> {
    let mut logins = JoinSet::new();
    for (index, conn) in connections.iter().cloned().enumerate() {
        logins.spawn(async move { (index, conn.connect().await) });
    }

    let mut results: Vec<Option<Result<GsaClient, CoreError>>> =
        std::iter::repeat_with(|| None).take(connections.len()).collect();
    while let Some(joined) = logins.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Some(slot) = results.get_mut(index) {
                    *slot = Some(result);
                }
            }
            Err(e) => warn!(error = %e, "login task failed"),
        }
    }

    connections
        .iter()
        .zip(results)
        .map(|(conn, result)| {
            let address = conn.endpoint.address();
            let result = result.unwrap_or_else(|| {
                Err(CoreError::ConnectionFailed {
                    address: address.clone(),
                    reason: "login task did not complete".into(),
                })
            });
            (address, result)
        })
        .collect()
}
