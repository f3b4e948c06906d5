//! `gsa monitor`: live crawl dashboard across appliances.

use std::collections::HashSet;
use std::time::Duration;

use gsa_api::GsaClient;
use gsa_config::Config;
use gsa_core::column::dashboard_columns;
use gsa_core::{
    ColumnSpec, ColumnValue, ConnectionConfig, Monitor, MonitorConfig, MonitorEvent, RowSnapshot,
    RowStatus,
};
use indexmap::IndexMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cli::{GlobalOpts, MonitorArgs, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

fn status_cell(status: &RowStatus) -> String {
    match status {
        RowStatus::Pending => "pending".into(),
        RowStatus::Fresh { at } => at.format("%H:%M:%S").to_string(),
        RowStatus::Failed { at, .. } => format!("failed {}", at.format("%H:%M:%S")),
    }
}

fn row_cells(values: &IndexMap<String, Option<ColumnValue>>, status: &RowStatus) -> Vec<String> {
    let mut cells: Vec<String> = values
        .values()
        .map(|v| v.as_ref().map_or_else(|| "-".into(), ToString::to_string))
        .collect();
    cells.push(status_cell(status));
    cells
}

fn render_rows(columns: &[ColumnSpec], rows: &[RowSnapshot]) -> String {
    let mut header: Vec<String> = columns.iter().map(|c| c.header.clone()).collect();
    header.push("Updated".into());
    let cells = rows
        .iter()
        .map(|row| row_cells(&row.values, &row.status))
        .collect();
    output::render_grid(header, cells)
}

fn print_snapshot(
    monitor: &Monitor,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let rows = monitor.snapshot();
    let out = output::render_single(format, &rows, |rows| render_rows(monitor.columns(), rows))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Log in to one appliance. A failed login still yields a row: it is
/// tracked without a session and shows up as failing.
async fn open_row(conn: ConnectionConfig) -> Result<GsaClient, CliError> {
    match conn.connect().await {
        Ok(client) => Ok(client),
        Err(e) => {
            warn!(
                address = %conn.endpoint.address(),
                error = %e,
                "login failed, tracking without a session"
            );
            Ok(GsaClient::from_transport(
                conn.endpoint.clone(),
                None,
                &conn.transport(),
            )?)
        }
    }
}

pub async fn handle(
    args: MonitorArgs,
    global: &GlobalOpts,
    cfg: &Config,
    format: OutputFormat,
) -> Result<(), CliError> {
    let hosts = if args.hosts.is_empty() {
        cfg.monitor.hosts.clone()
    } else {
        args.hosts
    };
    if hosts.is_empty() {
        return Err(CliError::Validation {
            field: "hosts".into(),
            reason: "no appliances given and [monitor].hosts is empty".into(),
        });
    }
    let endpoints = config::parse_endpoints(&hosts)?;
    let connections = config::connection_configs_for(global, cfg, &endpoints)?;

    let refresh_interval = args.interval.map_or_else(
        || cfg.monitor.refresh_interval(),
        |secs| Duration::from_secs(secs.max(1)),
    );
    let monitor = Monitor::new(MonitorConfig {
        columns: dashboard_columns(),
        refresh_interval,
    });
    let mut events = monitor.subscribe();

    // Rows appear as their logins finish.
    let mut logins = JoinSet::new();
    for conn in connections {
        logins.spawn(open_row(conn));
    }

    let mut total = logins.len();
    let mut refreshed = HashSet::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break,
            Some(joined) = logins.join_next(), if !logins.is_empty() => match joined {
                Ok(client) => {
                    monitor.add_endpoint(client?);
                }
                Err(e) => {
                    warn!(error = %e, "login task failed");
                    total -= 1;
                    if args.once && refreshed.len() >= total {
                        print_snapshot(&monitor, global, format)?;
                        break;
                    }
                }
            },
            event = events.recv() => match event {
                Ok(MonitorEvent::RowUpdated { row, .. }) => {
                    refreshed.insert(row);
                    if !args.once {
                        print_snapshot(&monitor, global, format)?;
                    } else if refreshed.len() >= total {
                        print_snapshot(&monitor, global, format)?;
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "monitor events lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    monitor.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn unknown_values_show_as_dash() {
        let mut values = IndexMap::new();
        values.insert("Host".to_owned(), Some(ColumnValue::Text("gsa1:8000".into())));
        values.insert("Crawl Paused".to_owned(), None);
        values.insert("Docs Found".to_owned(), Some(ColumnValue::Integer(-99_999)));

        let cells = row_cells(&values, &RowStatus::Pending);
        assert_eq!(cells, vec!["gsa1:8000", "-", "-99999", "pending"]);
    }

    #[test]
    fn failed_rows_are_marked() {
        let status = RowStatus::Failed {
            at: Utc::now(),
            message: "refused".into(),
        };
        assert!(status_cell(&status).starts_with("failed "));
    }

    #[test]
    fn table_has_one_header_per_column() {
        let table = render_rows(&dashboard_columns(), &[]);
        for header in ["Host", "Selected", "Crawl Paused", "Doc Limit", "Crawl Rate", "Updated"] {
            assert!(table.contains(header), "missing {header}");
        }
    }
}
