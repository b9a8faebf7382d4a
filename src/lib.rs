//! Daily dealership inventory snapshots.
//!
//! Extracted vehicle records are normalized into a dated snapshot, compared
//! by VIN with the most recent earlier snapshot, and the additions and
//! removals are grouped by (year, make, model) for reporting.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod report;
pub mod run;
pub mod snapshot;
pub mod store;

pub use aggregate::{aggregate, GroupSummary};
pub use error::{Error, ExclusionReason, StoreError};
pub use normalize::{normalize, RawRecord};
pub use run::{run_daily, RunOutcome};
pub use snapshot::{Exclusion, Label, Snapshot, VehicleRecord};
pub use store::diff::{diff, ChangeType, DiffResult};
pub use store::{SnapshotInfo, SnapshotStore, SqliteStore};
