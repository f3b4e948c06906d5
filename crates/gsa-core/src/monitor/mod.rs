// ── Appliance monitor ──
//
// Tracks many appliances at once. Every row gets its own polling task;
// tasks never write row state themselves but send results over a channel
// to a single merge task. Operator calls and the merge task share one
// short-lived lock over the row table, so a removal and a result write
// always serialize, and a result for a removed row is dropped.

mod refresh;
mod task;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use gsa_api::GsaClient;
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::column::{self, ColumnSource, ColumnSpec, ColumnValue};
use crate::fleet::{self, FleetCommand, FleetReport};

pub use refresh::refresh_row;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Default delay between the end of one refresh and the start of the next.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

// ── Public types ─────────────────────────────────────────────────────

/// Stable handle for one row. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of the most recent refresh of a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RowStatus {
    /// No refresh has completed yet.
    Pending,
    Fresh {
        at: DateTime<Utc>,
    },
    /// Numeric columns hold their sentinel values.
    Failed {
        at: DateTime<Utc>,
        message: String,
    },
}

/// Change notifications. Exactly one `RowUpdated` is sent per completed
/// refresh cycle of a row that is still tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    RowAdded(RowId),
    RowRemoved(RowId),
    RowUpdated { row: RowId, ok: bool },
    SelectionChanged { row: RowId, selected: bool },
}

/// Column table and schedule, fixed for the monitor's lifetime.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub columns: Vec<ColumnSpec>,
    pub refresh_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            columns: column::dashboard_columns(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Point-in-time copy of one row, with every column resolved.
#[derive(Debug, Clone, Serialize)]
pub struct RowSnapshot {
    pub id: RowId,
    pub address: String,
    pub selected: bool,
    pub status: RowStatus,
    /// Keyed by column header, in column order.
    pub values: IndexMap<String, Option<ColumnValue>>,
}

impl RowSnapshot {
    pub fn value(&self, header: &str) -> Option<&ColumnValue> {
        self.values.get(header).and_then(Option::as_ref)
    }
}

// ── Shared state ─────────────────────────────────────────────────────

struct RowState {
    client: Arc<GsaClient>,
    selected: bool,
    /// Aligned with the column table; local columns stay `None`.
    values: Vec<Option<ColumnValue>>,
    status: RowStatus,
    cancel: CancellationToken,
}

/// State reachable from both the `Monitor` handle and the merge task.
struct Shared {
    columns: Arc<[ColumnSpec]>,
    rows: RwLock<IndexMap<RowId, RowState>>,
    events: broadcast::Sender<MonitorEvent>,
}

impl Shared {
    fn read_rows(&self) -> RwLockReadGuard<'_, IndexMap<RowId, RowState>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rows(&self) -> RwLockWriteGuard<'_, IndexMap<RowId, RowState>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: MonitorEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn snapshot_of(&self, id: RowId, row: &RowState) -> RowSnapshot {
        let address = row.client.address();
        let values = self
            .columns
            .iter()
            .zip(&row.values)
            .map(|(spec, cached)| {
                let value = match spec.source {
                    ColumnSource::Host => Some(ColumnValue::Text(address.clone())),
                    ColumnSource::Selection => Some(ColumnValue::Flag(row.selected)),
                    ColumnSource::Remote { .. } => cached.clone(),
                };
                (spec.header.clone(), value)
            })
            .collect();
        RowSnapshot {
            id,
            address,
            selected: row.selected,
            status: row.status.clone(),
            values,
        }
    }
}

// ── Monitor ──────────────────────────────────────────────────────────

/// Handle to a running monitor. Cheaply cloneable; all clones share the
/// same rows. Dropping the last clone stops every task.
///
/// Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    shared: Arc<Shared>,
    refresh_interval: Duration,
    updates: mpsc::UnboundedSender<task::RowUpdate>,
    cancel: CancellationToken,
    next_id: AtomicU64,
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (updates, updates_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let shared = Arc::new(Shared {
            columns: config.columns.into(),
            rows: RwLock::new(IndexMap::new()),
            events,
        });

        tokio::spawn(task::merge_task(
            Arc::clone(&shared),
            updates_rx,
            cancel.clone(),
        ));

        Self {
            inner: Arc::new(MonitorInner {
                shared,
                refresh_interval: config.refresh_interval,
                updates,
                cancel,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.inner.shared.columns
    }

    /// Receive change notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.inner.shared.events.subscribe()
    }

    /// Start tracking an appliance. Its first refresh begins immediately.
    pub fn add_endpoint(&self, client: GsaClient) -> RowId {
        let id = RowId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let client = Arc::new(client);
        let cancel = self.inner.cancel.child_token();
        let shared = &self.inner.shared;

        shared.write_rows().insert(
            id,
            RowState {
                client: Arc::clone(&client),
                selected: false,
                values: vec![None; shared.columns.len()],
                status: RowStatus::Pending,
                cancel: cancel.clone(),
            },
        );
        info!(row = %id, address = %client.address(), "tracking appliance");
        shared.emit(MonitorEvent::RowAdded(id));

        tokio::spawn(task::row_task(task::RowTask {
            row: id,
            client,
            columns: Arc::clone(&shared.columns),
            period: self.inner.refresh_interval,
            cancel,
            updates: self.inner.updates.clone(),
        }));
        id
    }

    /// Stop tracking one row. Returns `false` if it was already gone.
    pub fn remove(&self, row: RowId) -> bool {
        let removed = self.inner.shared.write_rows().shift_remove(&row);
        match removed {
            Some(state) => {
                self.retire(row, &state);
                true
            }
            None => false,
        }
    }

    /// Stop tracking every selected row. Returns how many were removed.
    pub fn remove_selected(&self) -> usize {
        let removed: Vec<(RowId, RowState)> = {
            let mut rows = self.inner.shared.write_rows();
            let ids: Vec<RowId> = rows
                .iter()
                .filter(|(_, r)| r.selected)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| rows.shift_remove(&id).map(|state| (id, state)))
                .collect()
        };
        for (id, state) in &removed {
            self.retire(*id, state);
        }
        removed.len()
    }

    fn retire(&self, id: RowId, state: &RowState) {
        state.cancel.cancel();
        info!(row = %id, address = %state.client.address(), "stopped tracking appliance");
        self.inner.shared.emit(MonitorEvent::RowRemoved(id));
    }

    /// Set one row's selection flag. Does not trigger a refresh.
    pub fn set_selected(&self, row: RowId, selected: bool) -> bool {
        let changed = {
            let mut rows = self.inner.shared.write_rows();
            match rows.get_mut(&row) {
                Some(state) => {
                    let changed = state.selected != selected;
                    state.selected = selected;
                    Some(changed)
                }
                None => None,
            }
        };
        if changed == Some(true) {
            self.inner
                .shared
                .emit(MonitorEvent::SelectionChanged { row, selected });
        }
        changed.is_some()
    }

    /// Select or deselect every row.
    pub fn select_all(&self, selected: bool) {
        let changed: Vec<RowId> = {
            let mut rows = self.inner.shared.write_rows();
            rows.iter_mut()
                .filter(|(_, state)| state.selected != selected)
                .map(|(id, state)| {
                    state.selected = selected;
                    *id
                })
                .collect()
        };
        for row in changed {
            self.inner
                .shared
                .emit(MonitorEvent::SelectionChanged { row, selected });
        }
    }

    /// Clients of the currently selected rows, in row order.
    pub fn selected_clients(&self) -> Vec<Arc<GsaClient>> {
        self.inner
            .shared
            .read_rows()
            .values()
            .filter(|r| r.selected)
            .map(|r| Arc::clone(&r.client))
            .collect()
    }

    /// Send `command` to every selected appliance, then clear the
    /// selection. Rows keep polling throughout.
    pub async fn apply_to_selected(&self, command: FleetCommand) -> FleetReport {
        let clients = self.selected_clients();
        info!(%command, appliances = clients.len(), "applying to selection");
        let report = fleet::apply(clients.iter().map(Arc::as_ref), command).await;
        self.select_all(false);
        report
    }

    pub fn snapshot(&self) -> Vec<RowSnapshot> {
        let shared = &self.inner.shared;
        shared
            .read_rows()
            .iter()
            .map(|(id, row)| shared.snapshot_of(*id, row))
            .collect()
    }

    pub fn row(&self, id: RowId) -> Option<RowSnapshot> {
        let shared = &self.inner.shared;
        shared
            .read_rows()
            .get(&id)
            .map(|row| shared.snapshot_of(id, row))
    }

    pub fn len(&self) -> usize {
        self.inner.shared.read_rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop every row task and the merge task. Rows stay readable.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}
