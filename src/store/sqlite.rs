//! SQLite snapshot storage.
//!
//! Two tables:
//! - snapshots: date (primary key), vehicle_count
//! - vehicles: snapshot_date, vin, year, make, model, url
//!
//! Dates are stored as `YYYY-MM-DD` text, so ordering by the column is
//! chronological.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{SnapshotInfo, SnapshotStore};
use crate::error::{Error, StoreError};
use crate::snapshot::{Label, Snapshot, VehicleRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATABASE_FILE: &str = "lotwatch.db";

/// ~/.local/share/lotwatch/lotwatch.db or platform equivalent. `None` when
/// the platform has no home directory.
pub fn default_database_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lotwatch").map(|dirs| dirs.data_dir().join(DATABASE_FILE))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            date TEXT PRIMARY KEY,
            vehicle_count INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS vehicles (
            snapshot_date TEXT NOT NULL,
            vin TEXT NOT NULL,
            year INTEGER,
            make TEXT NOT NULL,
            model TEXT NOT NULL,
            url TEXT NOT NULL,
            PRIMARY KEY(snapshot_date, vin),
            FOREIGN KEY(snapshot_date) REFERENCES snapshots(date) ON DELETE CASCADE
        )",
        [],
    )?;

    Ok(())
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(text: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("snapshot date '{text}': {e}")))
}

/// SQLite-backed snapshot store. Open once per command, reuse across all
/// operations.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::unavailable("open"))?;
        tracing::debug!(path = %path.display(), "opened snapshot database");
        Self::init(conn)
    }

    /// Opens the database in the platform data directory, creating the
    /// directory on first use.
    pub fn open_default() -> Result<Self, Error> {
        let path = default_database_path().ok_or(Error::DataDir)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(Error::io(dir))?;
        }
        Ok(Self::open(&path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::unavailable("open"))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StoreError::unavailable("configure"))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(StoreError::unavailable("configure"))?;
        init_schema(&conn).map_err(StoreError::unavailable("init schema"))?;
        Ok(SqliteStore { conn })
    }

    fn load_vehicles(&self, date: NaiveDate) -> rusqlite::Result<Vec<VehicleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT vin, year, make, model, url
             FROM vehicles
             WHERE snapshot_date = ?1",
        )?;

        let records = stmt
            .query_map(params![date_key(date)], |row| {
                Ok(VehicleRecord {
                    vin: row.get(0)?,
                    year: row.get(1)?,
                    make: Label::new(&row.get::<_, String>(2)?),
                    model: Label::new(&row.get::<_, String>(3)?),
                    url: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl SnapshotStore for SqliteStore {
    fn load_previous(&self, before: NaiveDate) -> Result<Option<Snapshot>, StoreError> {
        let previous: Option<String> = self
            .conn
            .query_row(
                "SELECT date FROM snapshots WHERE date < ?1 ORDER BY date DESC LIMIT 1",
                params![date_key(before)],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::unavailable("load previous"))?;

        match previous {
            Some(text) => self.load(parse_date(&text)?),
            None => {
                tracing::info!(before = %before, "no earlier snapshot stored");
                Ok(None)
            }
        }
    }

    fn save(&mut self, snapshot: &Snapshot, overwrite: bool) -> Result<(), StoreError> {
        let date = date_key(snapshot.date());

        // immediate: takes the write lock before the existence check
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::unavailable("save"))?;

        let exists = tx
            .query_row("SELECT 1 FROM snapshots WHERE date = ?1", params![date], |_| Ok(()))
            .optional()
            .map_err(StoreError::unavailable("save"))?
            .is_some();

        if exists {
            if !overwrite {
                return Err(StoreError::DuplicateSnapshot(snapshot.date()));
            }
            tracing::warn!(date = %date, "overwriting stored snapshot");
            tx.execute("DELETE FROM vehicles WHERE snapshot_date = ?1", params![date])
                .map_err(StoreError::unavailable("save"))?;
            tx.execute("DELETE FROM snapshots WHERE date = ?1", params![date])
                .map_err(StoreError::unavailable("save"))?;
        }

        tx.execute(
            "INSERT INTO snapshots (date, vehicle_count) VALUES (?1, ?2)",
            params![date, i64::try_from(snapshot.len()).unwrap_or(i64::MAX)],
        )
        .map_err(StoreError::unavailable("save"))?;

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO vehicles (snapshot_date, vin, year, make, model, url)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(StoreError::unavailable("save"))?;

            for record in snapshot.sorted_records() {
                stmt.execute(params![
                    date,
                    record.vin,
                    record.year,
                    record.make.display(),
                    record.model.display(),
                    record.url
                ])
                .map_err(StoreError::unavailable("save"))?;
            }
        }

        tx.commit().map_err(StoreError::unavailable("save"))?;
        tracing::info!(date = %date, vehicles = snapshot.len(), "saved snapshot");
        Ok(())
    }

    fn load(&self, date: NaiveDate) -> Result<Option<Snapshot>, StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM snapshots WHERE date = ?1",
                params![date_key(date)],
                |_| Ok(()),
            )
            .optional()
            .map_err(StoreError::unavailable("load"))?
            .is_some();

        if !exists {
            return Ok(None);
        }

        let records = self.load_vehicles(date).map_err(StoreError::unavailable("load"))?;
        let (snapshot, rejected) = Snapshot::from_records(date, records);
        if let Some(bad) = rejected.first() {
            return Err(StoreError::Corrupt(format!(
                "snapshot {date} holds an invalid vehicle row (vin '{}')",
                bad.vin
            )));
        }

        Ok(Some(snapshot))
    }

    fn list(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, vehicle_count FROM snapshots ORDER BY date DESC")
            .map_err(StoreError::unavailable("list"))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(StoreError::unavailable("list"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::unavailable("list"))?;

        rows.into_iter()
            .map(|(date, count)| {
                Ok(SnapshotInfo {
                    date: parse_date(&date)?,
                    vehicles: count.max(0) as usize,
                })
            })
            .collect()
    }
}
