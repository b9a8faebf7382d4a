//! Vehicle records and the per-run inventory snapshot.
//!
//! A snapshot is built once per run from normalized extractor output and is
//! not mutated afterwards. Records are indexed by VIN so the diff engine can
//! answer membership questions with a hash lookup.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ExclusionReason;
use crate::normalize::{self, RawRecord};

/// Make or model text in two forms: `display` keeps the source casing,
/// `folded` is what equality, hashing and grouping compare.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "String")]
pub struct Label {
    display: String,
    folded: String,
}

impl Label {
    /// Trims, collapses internal whitespace runs to a single space and
    /// derives the case-folded key.
    pub fn new(text: &str) -> Self {
        let display = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let folded = display.to_lowercase();
        Label { display, folded }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Label::new(&text)
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Label::new(text)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.display
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// One inventory listing at a point in time. `vin` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRecord {
    pub year: Option<i32>,
    pub make: Label,
    pub model: Label,
    pub vin: String,
    pub url: String,
}

impl VehicleRecord {
    /// Year as report text; unknown years render empty.
    pub fn year_text(&self) -> String {
        format_year(self.year)
    }
}

pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

/// A raw record that did not make it into the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    /// Position in the extractor output.
    pub index: usize,
    pub url: String,
    pub vin: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    date: NaiveDate,
    records: HashMap<String, VehicleRecord>,
}

impl Snapshot {
    /// Normalizes extractor output into a snapshot for `date`.
    ///
    /// Records without a VIN and repeated VINs are excluded and returned
    /// alongside the snapshot; the first occurrence of a VIN wins.
    pub fn capture(date: NaiveDate, raws: &[RawRecord]) -> (Snapshot, Vec<Exclusion>) {
        let mut exclusions = Vec::new();
        let mut records = Vec::with_capacity(raws.len());

        for (index, raw) in raws.iter().enumerate() {
            match normalize::normalize(raw) {
                Ok(record) => records.push((index, record)),
                Err(reason) => exclusions.push(Exclusion {
                    index,
                    url: normalize::resolve_url(raw),
                    vin: String::new(),
                    reason,
                }),
            }
        }

        let (snapshot, duplicates) = Snapshot::index(date, records);
        exclusions.extend(duplicates);
        exclusions.sort_by_key(|e| e.index);

        for exclusion in &exclusions {
            tracing::warn!(
                index = exclusion.index,
                url = %exclusion.url,
                vin = %exclusion.vin,
                reason = exclusion.reason.as_str(),
                "record excluded from snapshot"
            );
        }

        (snapshot, exclusions)
    }

    /// Builds a snapshot from records that are already normalized, such as
    /// rows read back from the store.
    pub fn from_records(
        date: NaiveDate,
        records: impl IntoIterator<Item = VehicleRecord>,
    ) -> (Snapshot, Vec<Exclusion>) {
        Snapshot::index(date, records.into_iter().enumerate())
    }

    fn index(
        date: NaiveDate,
        records: impl IntoIterator<Item = (usize, VehicleRecord)>,
    ) -> (Snapshot, Vec<Exclusion>) {
        let mut by_vin = HashMap::new();
        let mut duplicates = Vec::new();

        for (index, record) in records {
            if record.vin.is_empty() {
                duplicates.push(Exclusion {
                    index,
                    url: record.url,
                    vin: String::new(),
                    reason: ExclusionReason::MissingVin,
                });
                continue;
            }

            match by_vin.entry(record.vin.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(_) => duplicates.push(Exclusion {
                    index,
                    url: record.url,
                    vin: record.vin,
                    reason: ExclusionReason::DuplicateVin,
                }),
            }
        }

        (Snapshot { date, records: by_vin }, duplicates)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, vin: &str) -> bool {
        self.records.contains_key(vin)
    }

    pub fn get(&self, vin: &str) -> Option<&VehicleRecord> {
        self.records.get(vin)
    }

    /// Unordered iteration over the records.
    pub fn records(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.records.values()
    }

    /// Records ordered by VIN, for reports and persistence.
    pub fn sorted_records(&self) -> Vec<&VehicleRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.vin.cmp(&b.vin));
        records
    }
}
