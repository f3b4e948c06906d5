//! Monitoring and bulk operations on top of `gsa-api`.
//!
//! - **[`Monitor`]**: tracks many appliances, one polling task per row,
//!   with results merged through a single channel consumer. Failing rows
//!   degrade to sentinel values instead of stopping.
//! - **[`column`]**: the column table the monitor fetches and coerces.
//! - **[`fleet`]**: crawl and index commands sent to many appliances.
//! - **[`paginate`]** / **[`acl`]**: line-windowed listing and policy ACL
//!   import for the `policyAcls` feed.
//! - **[`ConnectionConfig`]**: what the CLI hands in to open a session.

pub mod acl;
pub mod column;
pub mod config;
pub mod error;
pub mod fleet;
pub mod monitor;
pub mod paginate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use acl::{AclRule, ImportReport};
pub use column::{ColumnKind, ColumnSource, ColumnSpec, ColumnValue};
pub use config::{ConnectionConfig, TlsVerification};
pub use error::CoreError;
pub use fleet::{FleetCommand, FleetReport};
pub use monitor::{Monitor, MonitorConfig, MonitorEvent, RowId, RowSnapshot, RowStatus};
