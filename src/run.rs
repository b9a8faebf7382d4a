//! The daily run: capture today's snapshot, diff it against the previous
//! one, group the changes and persist today's snapshot.

use chrono::NaiveDate;

use crate::aggregate::{aggregate, GroupSummary};
use crate::error::StoreError;
use crate::normalize::RawRecord;
use crate::snapshot::{Exclusion, Snapshot};
use crate::store::diff::{diff, DiffResult};
use crate::store::SnapshotStore;

/// Everything a report writer needs for one run.
#[derive(Debug)]
pub struct RunOutcome {
    pub date: NaiveDate,
    pub snapshot: Snapshot,
    pub diff: DiffResult,
    pub added_groups: Vec<GroupSummary>,
    pub removed_groups: Vec<GroupSummary>,
    pub exclusions: Vec<Exclusion>,
}

impl RunOutcome {
    /// Diff and group an already captured snapshot against `prior`.
    pub fn compare(prior: Option<&Snapshot>, snapshot: Snapshot, exclusions: Vec<Exclusion>) -> Self {
        let diff = diff(prior, &snapshot);
        let added_groups = aggregate(&diff.added);
        let removed_groups = aggregate(&diff.removed);

        RunOutcome {
            date: snapshot.date(),
            snapshot,
            diff,
            added_groups,
            removed_groups,
            exclusions,
        }
    }
}

/// Runs the full daily cycle against `store`.
///
/// The previous snapshot is read before today's is written. Any store
/// failure aborts the run; a failed save is never reported as success.
pub fn run_daily<S: SnapshotStore>(
    store: &mut S,
    date: NaiveDate,
    raws: &[RawRecord],
    overwrite: bool,
) -> Result<RunOutcome, StoreError> {
    let (snapshot, exclusions) = Snapshot::capture(date, raws);
    tracing::info!(
        date = %date,
        vehicles = snapshot.len(),
        excluded = exclusions.len(),
        "captured snapshot"
    );

    let prior = store.load_previous(date)?;
    let outcome = RunOutcome::compare(prior.as_ref(), snapshot, exclusions);

    store.save(&outcome.snapshot, overwrite)?;

    tracing::info!(
        added = outcome.diff.added.len(),
        removed = outcome.diff.removed.len(),
        added_groups = outcome.added_groups.len(),
        removed_groups = outcome.removed_groups.len(),
        "run complete"
    );

    Ok(outcome)
}
