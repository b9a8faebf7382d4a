//! Snapshot persistence.
//!
//! One snapshot per calendar date. A run reads the most recent snapshot
//! strictly before its reference date, then saves its own.
//!
//! Supports:
//! - Loading the previous snapshot (none on a first run)
//! - Saving with duplicate-date protection and explicit overwrite
//! - Listing stored snapshots and loading one by date

pub mod diff;
pub mod sqlite;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::StoreError;
use crate::snapshot::Snapshot;

pub use sqlite::SqliteStore;

/// Stored snapshot metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub date: NaiveDate,
    pub vehicles: usize,
}

pub trait SnapshotStore {
    /// Latest snapshot dated strictly before `before`. `Ok(None)` means no
    /// prior run exists; read failures are errors, never `None`.
    fn load_previous(&self, before: NaiveDate) -> Result<Option<Snapshot>, StoreError>;

    /// Persist `snapshot` under its date. Fails with
    /// [`StoreError::DuplicateSnapshot`] when that date is already stored and
    /// `overwrite` is false, leaving the store untouched.
    fn save(&mut self, snapshot: &Snapshot, overwrite: bool) -> Result<(), StoreError>;

    fn load(&self, date: NaiveDate) -> Result<Option<Snapshot>, StoreError>;

    /// Newest first.
    fn list(&self) -> Result<Vec<SnapshotInfo>, StoreError>;
}
