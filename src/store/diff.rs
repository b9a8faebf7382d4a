//! Snapshot comparison engine.
//!
//! Compares two snapshots by VIN and reports:
//! - added: present today, absent from the prior snapshot
//! - removed: present in the prior snapshot, absent today
//!
//! A VIN present on both sides is retained even when its year, make, model
//! or url text changed between runs.

use chrono::NaiveDate;
use serde::Serialize;

use crate::snapshot::{Snapshot, VehicleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChangeType {
    Added,
    Removed,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "Added",
            ChangeType::Removed => "Removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaRow<'a> {
    pub change: ChangeType,
    pub record: &'a VehicleRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffResult {
    /// Date of the prior snapshot; `None` on a first run.
    pub from_date: Option<NaiveDate>,
    pub to_date: NaiveDate,
    /// Sorted by VIN.
    pub added: Vec<VehicleRecord>,
    /// Sorted by VIN.
    pub removed: Vec<VehicleRecord>,
    pub retained: usize,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Record-level delta, ordered by change type then VIN.
    pub fn delta(&self) -> Vec<DeltaRow<'_>> {
        let added = self.added.iter().map(|record| DeltaRow { change: ChangeType::Added, record });
        let removed = self.removed.iter().map(|record| DeltaRow { change: ChangeType::Removed, record });

        let mut rows: Vec<_> = added.chain(removed).collect();
        rows.sort_by(|a, b| a.change.cmp(&b.change).then_with(|| a.record.vin.cmp(&b.record.vin)));
        rows
    }
}

/// Records of `from` whose VIN is missing in `to`, sorted by VIN.
fn missing_from(from: &Snapshot, to: &Snapshot) -> Vec<VehicleRecord> {
    let mut records: Vec<_> = from
        .records()
        .filter(|record| !to.contains(&record.vin))
        .cloned()
        .collect();
    records.sort_by(|a, b| a.vin.cmp(&b.vin));
    records
}

/// Compare the prior snapshot (if any) with today's.
pub fn diff(prior: Option<&Snapshot>, current: &Snapshot) -> DiffResult {
    let Some(prior) = prior else {
        // first run: the whole inventory is new
        let added: Vec<_> = current.sorted_records().into_iter().cloned().collect();
        tracing::debug!(added = added.len(), "no prior snapshot, treating all records as added");

        return DiffResult {
            from_date: None,
            to_date: current.date(),
            added,
            removed: Vec::new(),
            retained: 0,
        };
    };

    let added = missing_from(current, prior);
    let removed = missing_from(prior, current);
    let retained = current.len() - added.len();

    tracing::debug!(
        from = %prior.date(),
        to = %current.date(),
        added = added.len(),
        removed = removed.len(),
        retained,
        "compared snapshots"
    );

    DiffResult {
        from_date: Some(prior.date()),
        to_date: current.date(),
        added,
        removed,
        retained,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Label;
    use std::collections::HashSet;

    fn vehicle(vin: &str, year: i32, make: &str, model: &str) -> VehicleRecord {
        VehicleRecord {
            year: Some(year),
            make: Label::new(make),
            model: Label::new(model),
            vin: vin.to_string(),
            url: format!("https://dealer.example/inventory/{vin}"),
        }
    }

    fn snapshot(day: u32, records: Vec<VehicleRecord>) -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        Snapshot::from_records(date, records).0
    }

    fn vins(records: &[VehicleRecord]) -> Vec<&str> {
        records.iter().map(|r| r.vin.as_str()).collect()
    }

    fn prior() -> Snapshot {
        snapshot(1, vec![
            vehicle("AAA1", 2020, "Toyota", "Camry"),
            vehicle("BBB2", 2019, "Honda", "Civic"),
        ])
    }

    fn current() -> Snapshot {
        snapshot(2, vec![
            vehicle("AAA1", 2020, "Toyota", "Camry"),
            vehicle("CCC3", 2021, "Toyota", "Corolla"),
        ])
    }

    #[test]
    fn added_and_removed_detected() {
        let result = diff(Some(&prior()), &current());
        assert_eq!(vins(&result.added), vec!["CCC3"]);
        assert_eq!(vins(&result.removed), vec!["BBB2"]);
        assert_eq!(result.retained, 1);
        assert_eq!(result.from_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn first_run_everything_added() {
        let today = current();
        let result = diff(None, &today);

        assert_eq!(vins(&result.added), vec!["AAA1", "CCC3"]);
        assert!(result.removed.is_empty());
        assert_eq!(result.from_date, None);
        assert_eq!(result.retained, 0);
    }

    #[test]
    fn first_run_with_empty_inventory() {
        let result = diff(None, &snapshot(2, vec![]));
        assert!(result.is_empty());
    }

    #[test]
    fn unchanged_snapshot_has_no_delta() {
        let a = prior();
        let result = diff(Some(&a), &a);
        assert!(result.added.is_empty());
        assert!(result.removed.is_empty());
        assert_eq!(result.retained, 2);
    }

    #[test]
    fn added_and_removed_are_disjoint() {
        let result = diff(Some(&prior()), &current());
        let added: HashSet<_> = result.added.iter().map(|r| &r.vin).collect();
        let removed: HashSet<_> = result.removed.iter().map(|r| &r.vin).collect();
        assert!(added.is_disjoint(&removed));
    }

    #[test]
    fn diff_is_symmetric() {
        let (a, b) = (prior(), current());
        let forward = diff(Some(&a), &b);
        let backward = diff(Some(&b), &a);

        assert_eq!(forward.added, backward.removed);
        assert_eq!(forward.removed, backward.added);
    }

    #[test]
    fn field_drift_is_not_a_change() {
        let before = snapshot(1, vec![vehicle("AAA1", 2020, "Toyota", "Camry")]);
        let after = snapshot(2, vec![vehicle("AAA1", 2021, "Toyota", "Camry SE")]);

        let result = diff(Some(&before), &after);
        assert!(result.is_empty());
        assert_eq!(result.retained, 1);
    }

    #[test]
    fn delta_sorted_by_change_then_vin() {
        let before = snapshot(1, vec![
            vehicle("ZZZ9", 2018, "Ford", "Focus"),
            vehicle("MMM5", 2018, "Ford", "Fiesta"),
        ]);
        let after = snapshot(2, vec![
            vehicle("YYY8", 2022, "Kia", "Soul"),
            vehicle("BBB2", 2022, "Kia", "Rio"),
        ]);

        let result = diff(Some(&before), &after);
        let rows: Vec<_> = result
            .delta()
            .iter()
            .map(|row| (row.change, row.record.vin.as_str()))
            .collect();

        assert_eq!(rows, vec![
            (ChangeType::Added, "BBB2"),
            (ChangeType::Added, "YYY8"),
            (ChangeType::Removed, "MMM5"),
            (ChangeType::Removed, "ZZZ9"),
        ]);
    }
}
