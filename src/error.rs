//! Error taxonomy.
//!
//! Exclusions are collected per record and never abort a run. Store errors
//! always abort the run.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Why a raw record was left out of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Error)]
pub enum ExclusionReason {
    #[error("missing VIN")]
    #[serde(rename = "MissingVIN")]
    MissingVin,
    #[error("duplicate VIN")]
    #[serde(rename = "DuplicateVIN")]
    DuplicateVin,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::MissingVin => "MissingVIN",
            ExclusionReason::DuplicateVin => "DuplicateVIN",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a snapshot for {0} already exists (pass --overwrite to replace it)")]
    DuplicateSnapshot(NaiveDate),

    #[error("snapshot store unavailable during {op}: {source}")]
    Unavailable {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("snapshot store holds an unreadable row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub(crate) fn unavailable(op: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
        move |source| StoreError::Unavailable { op, source }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid raw records in {origin}: {source}")]
    Input {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not render json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not determine a data directory for the snapshot database")]
    DataDir,

    /// Reports failed after the snapshot for `date` was committed.
    #[error(
        "snapshot for {date} was saved but its reports could not be written: {source}; \
         rerun with --overwrite to regenerate them"
    )]
    Publish {
        date: NaiveDate,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
