//! JSON output for run results.
//!
//! Serializes the snapshot, grouped changes, delta and exclusions for
//! scripting and piping.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::GroupSummary;
use crate::run::RunOutcome;
use crate::snapshot::{Exclusion, VehicleRecord};
use crate::store::diff::DeltaRow;

#[derive(Serialize)]
struct RunReport<'a> {
    date: NaiveDate,
    previous: Option<NaiveDate>,
    vehicles: Vec<&'a VehicleRecord>,
    added_by_group: &'a [GroupSummary],
    removed_by_group: &'a [GroupSummary],
    delta: Vec<DeltaRow<'a>>,
    excluded: &'a [Exclusion],
}

pub fn render(outcome: &RunOutcome) -> serde_json::Result<String> {
    let report = RunReport {
        date: outcome.date,
        previous: outcome.diff.from_date,
        vehicles: outcome.snapshot.sorted_records(),
        added_by_group: &outcome.added_groups,
        removed_by_group: &outcome.removed_groups,
        delta: outcome.diff.delta(),
        excluded: &outcome.exclusions,
    };
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RawRecord;
    use crate::snapshot::Snapshot;

    #[test]
    fn renders_groups_and_delta() {
        let raws = vec![RawRecord {
            year: Some("2021".into()),
            make: Some("Toyota".into()),
            model: Some("Corolla".into()),
            vin: Some("CCC3".into()),
            ..RawRecord::default()
        }];
        let (snapshot, exclusions) =
            Snapshot::capture(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(), &raws);
        let outcome = RunOutcome::compare(None, snapshot, exclusions);

        let value: serde_json::Value = serde_json::from_str(&render(&outcome).unwrap()).unwrap();

        assert_eq!(value["date"], "2024-09-02");
        assert!(value["previous"].is_null());
        assert_eq!(value["added_by_group"][0]["vins"][0], "CCC3");
        assert_eq!(value["added_by_group"][0]["make"], "Toyota");
        assert_eq!(value["delta"][0]["change"], "Added");
        assert_eq!(value["delta"][0]["record"]["vin"], "CCC3");
        assert_eq!(value["removed_by_group"].as_array().unwrap().len(), 0);
    }
}
