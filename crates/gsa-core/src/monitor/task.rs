// Background tasks: one polling loop per row, one merge loop per monitor.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gsa_api::GsaClient;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{MonitorEvent, RowId, RowStatus, Shared, refresh};
use crate::column::{ColumnSpec, ColumnValue};

/// Result of one refresh cycle, sent from a row task to the merge task.
pub(super) struct RowUpdate {
    row: RowId,
    at: DateTime<Utc>,
    outcome: Result<Vec<Option<ColumnValue>>, String>,
}

pub(super) struct RowTask {
    pub row: RowId,
    pub client: Arc<GsaClient>,
    pub columns: Arc<[ColumnSpec]>,
    pub period: Duration,
    pub cancel: CancellationToken,
    pub updates: mpsc::UnboundedSender<RowUpdate>,
}

/// Poll one appliance until the row is cancelled.
///
/// The delay runs from the end of one cycle to the start of the next, so
/// cycles never overlap. An in-flight refresh is not interrupted by
/// cancellation; its result is simply not delivered.
pub(super) async fn row_task(task: RowTask) {
    let RowTask {
        row,
        client,
        columns,
        period,
        cancel,
        updates,
    } = task;
    debug!(row = %row, "row task started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let outcome = refresh::refresh_row(&client, &columns)
            .await
            .map_err(|e| {
                warn!(row = %row, address = %client.address(), error = %e, "refresh failed");
                e.to_string()
            });

        if cancel.is_cancelled() {
            break;
        }
        let update = RowUpdate {
            row,
            at: Utc::now(),
            outcome,
        };
        if updates.send(update).is_err() {
            break;
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(period) => {}
        }
    }

    debug!(row = %row, "row task stopped");
}

/// Single consumer for all refresh results.
///
/// Applies each result to its row under the table's write lock. Results
/// for rows that are no longer tracked are discarded.
pub(super) async fn merge_task(
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<RowUpdate>,
    cancel: CancellationToken,
) {
    debug!("merge task started");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            update = rx.recv() => {
                let Some(update) = update else { break };
                if let Some(event) = apply(&shared, update) {
                    shared.emit(event);
                }
            }
        }
    }
    debug!("merge task stopped");
}

fn apply(shared: &Shared, update: RowUpdate) -> Option<MonitorEvent> {
    let RowUpdate { row, at, outcome } = update;
    let mut rows = shared.write_rows();
    let Some(state) = rows.get_mut(&row) else {
        debug!(row = %row, "discarding result for removed row");
        return None;
    };

    let ok = outcome.is_ok();
    match outcome {
        Ok(values) => {
            for ((slot, spec), value) in state.values.iter_mut().zip(shared.columns.iter()).zip(values) {
                if spec.source.is_remote() {
                    *slot = value;
                }
            }
            state.status = RowStatus::Fresh { at };
        }
        Err(message) => {
            for (slot, spec) in state.values.iter_mut().zip(shared.columns.iter()) {
                if !spec.source.is_remote() {
                    continue;
                }
                if let Some(sentinel) = spec.kind.sentinel() {
                    *slot = Some(sentinel);
                }
            }
            state.status = RowStatus::Failed { at, message };
        }
    }

    Some(MonitorEvent::RowUpdated { row, ok })
}
