//! CSV report files.
//!
//! One run writes four files into the report directory:
//! - inventory_<date>.csv: every vehicle in today's snapshot
//! - added_by_group_<date>.csv / removed_by_group_<date>.csv: grouped changes
//! - delta_<date>.csv: record-level adds and removes
//!
//! Empty sections still produce a header-only file.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::aggregate::GroupSummary;
use crate::error::{Error, Result};
use crate::run::RunOutcome;
use crate::snapshot::{format_year, Snapshot};
use crate::store::diff::DiffResult;

const VIN_SEPARATOR: &str = ", ";

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row(out: &mut String, row: &[&str]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

pub fn inventory(snapshot: &Snapshot) -> String {
    let date = snapshot.date().to_string();
    let mut out = String::new();
    push_row(&mut out, &["Date", "Year", "Make", "Model", "VIN", "URL"]);

    for record in snapshot.sorted_records() {
        let year = record.year_text();
        push_row(&mut out, &[
            date.as_str(),
            year.as_str(),
            record.make.display(),
            record.model.display(),
            record.vin.as_str(),
            record.url.as_str(),
        ]);
    }
    out
}

pub fn groups(groups: &[GroupSummary]) -> String {
    let mut out = String::new();
    push_row(&mut out, &["Year", "Make", "Model", "Count", "VINs"]);

    for group in groups {
        let year = format_year(group.year);
        let count = group.count.to_string();
        let vins = group.vins.join(VIN_SEPARATOR);
        push_row(&mut out, &[
            year.as_str(),
            group.make.as_str(),
            group.model.as_str(),
            count.as_str(),
            vins.as_str(),
        ]);
    }
    out
}

pub fn delta(diff: &DiffResult) -> String {
    let mut out = String::new();
    push_row(&mut out, &["Change", "Year", "Make", "Model", "VIN", "URL"]);

    for row in diff.delta() {
        let year = row.record.year_text();
        push_row(&mut out, &[
            row.change.as_str(),
            year.as_str(),
            row.record.make.display(),
            row.record.model.display(),
            row.record.vin.as_str(),
            row.record.url.as_str(),
        ]);
    }
    out
}

/// Paths of the files written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub inventory: PathBuf,
    pub added_by_group: PathBuf,
    pub removed_by_group: PathBuf,
    pub delta: PathBuf,
}

impl ReportPaths {
    pub fn new(dir: &Path, date: NaiveDate) -> Self {
        let name = |prefix: &str| dir.join(format!("{prefix}_{}.csv", date.format("%Y-%m-%d")));
        ReportPaths {
            inventory: name("inventory"),
            added_by_group: name("added_by_group"),
            removed_by_group: name("removed_by_group"),
            delta: name("delta"),
        }
    }
}

/// Writes `contents` to a temp file beside `path` and renames it into place,
/// so a reader never sees a half-written report.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(Error::io(dir))?;
    file.write_all(contents.as_bytes()).map_err(Error::io(path))?;
    file.persist(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

pub fn write_reports(dir: &Path, outcome: &RunOutcome) -> Result<ReportPaths> {
    std::fs::create_dir_all(dir).map_err(Error::io(dir))?;
    let paths = ReportPaths::new(dir, outcome.date);

    write_atomic(&paths.inventory, &inventory(&outcome.snapshot))?;
    write_atomic(&paths.added_by_group, &groups(&outcome.added_groups))?;
    write_atomic(&paths.removed_by_group, &groups(&outcome.removed_groups))?;
    write_atomic(&paths.delta, &delta(&outcome.diff))?;

    tracing::info!(dir = %dir.display(), "wrote reports");
    Ok(paths)
}
