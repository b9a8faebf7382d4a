//! Groups vehicles by (year, make, model) for the summary reports.
//!
//! - Grouping compares the case-folded make/model, so "Toyota " and "toyota"
//!   share a group
//! - Display text comes from the member with the smallest VIN
//! - Groups sort newest year first (unknown year last), then make, then model

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::snapshot::VehicleRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub year: Option<i32>,
    pub make: String,
    pub model: String,
    pub count: usize,
    /// Ascending.
    pub vins: Vec<String>,
}

type GroupKey<'a> = (Option<i32>, &'a str, &'a str);

fn group_key(record: &VehicleRecord) -> GroupKey<'_> {
    (record.year, record.make.folded(), record.model.folded())
}

/// Newest first; an unknown year sorts after every known year.
fn compare_year(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_keys(a: &GroupKey<'_>, b: &GroupKey<'_>) -> Ordering {
    compare_year(a.0, b.0)
        .then_with(|| a.1.cmp(b.1))
        .then_with(|| a.2.cmp(b.2))
}

pub fn aggregate(records: &[VehicleRecord]) -> Vec<GroupSummary> {
    let mut groups: HashMap<GroupKey<'_>, Vec<&VehicleRecord>> = HashMap::new();
    for record in records {
        groups.entry(group_key(record)).or_default().push(record);
    }

    let mut keyed: Vec<_> = groups.into_iter().collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    keyed
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(|a, b| a.vin.cmp(&b.vin));
            let first = members[0];

            GroupSummary {
                year: key.0,
                make: first.make.display().to_string(),
                model: first.model.display().to_string(),
                count: members.len(),
                vins: members.iter().map(|m| m.vin.clone()).collect(),
            }
        })
        .collect()
}
