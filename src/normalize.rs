//! Canonicalizes raw extractor output into comparable vehicle records.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, ExclusionReason};
use crate::snapshot::{Label, VehicleRecord};

/// One vehicle as handed over by the extractor. Every field is loose text
/// and may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(deserialize_with = "loose_text")]
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub vin: Option<String>,
    /// Canonical link found on the detail page, if any.
    pub url: Option<String>,
    /// The detail page the extractor actually fetched.
    pub source_url: Option<String>,
}

/// Extractors emit years either as text or as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<LooseValue>::deserialize(deserializer)?.map(|value| match value {
        LooseValue::Text(text) => text,
        LooseValue::Integer(n) => n.to_string(),
        LooseValue::Float(f) => f.to_string(),
    }))
}

/// Parses a JSON array of raw records. `origin` names the source in errors.
pub fn parse_raw_records(text: &str, origin: &str) -> Result<Vec<RawRecord>, Error> {
    serde_json::from_str(text).map_err(|source| Error::Input {
        origin: origin.to_string(),
        source,
    })
}

/// Reads raw records from a file, or stdin when `path` is `-`.
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRecord>, Error> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(Error::io("<stdin>"))?;
        return parse_raw_records(&text, "<stdin>");
    }

    let text = std::fs::read_to_string(path).map_err(Error::io(path))?;
    parse_raw_records(&text, &path.display().to_string())
}

pub fn normalize(raw: &RawRecord) -> Result<VehicleRecord, ExclusionReason> {
    let vin = raw.vin.as_deref().unwrap_or_default().trim().to_uppercase();
    if vin.is_empty() {
        return Err(ExclusionReason::MissingVin);
    }

    Ok(VehicleRecord {
        year: parse_year(raw.year.as_deref()),
        make: Label::new(raw.make.as_deref().unwrap_or_default()),
        model: Label::new(raw.model.as_deref().unwrap_or_default()),
        vin,
        url: resolve_url(raw),
    })
}

/// Canonical link when present, otherwise the fetched page.
pub fn resolve_url(raw: &RawRecord) -> String {
    [raw.url.as_deref(), raw.source_url.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|u| !u.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn parse_year(text: Option<&str>) -> Option<i32> {
    text?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawRecord {
        RawRecord {
            year: Some("2021".into()),
            make: Some("Toyota".into()),
            model: Some("Corolla".into()),
            vin: Some("ccc3".into()),
            url: Some("https://dealer.example/inventory/toyota/corolla/1".into()),
            source_url: None,
        }
    }

    #[test]
    fn vin_is_trimmed_and_uppercased() {
        let record = normalize(&RawRecord { vin: Some("  1hgcm82633a004352\n".into()), ..raw() }).unwrap();
        assert_eq!(record.vin, "1HGCM82633A004352");
    }

    #[test]
    fn blank_vin_is_excluded() {
        assert_eq!(
            normalize(&RawRecord { vin: Some("   ".into()), ..raw() }),
            Err(ExclusionReason::MissingVin)
        );
        assert_eq!(
            normalize(&RawRecord { vin: None, ..raw() }),
            Err(ExclusionReason::MissingVin)
        );
    }

    #[test]
    fn unparseable_year_is_kept_as_unknown() {
        let record = normalize(&RawRecord { year: Some("20XX".into()), ..raw() }).unwrap();
        assert_eq!(record.year, None);

        let record = normalize(&RawRecord { year: None, ..raw() }).unwrap();
        assert_eq!(record.year, None);

        let record = normalize(&RawRecord { year: Some(" 2019 ".into()), ..raw() }).unwrap();
        assert_eq!(record.year, Some(2019));
    }

    #[test]
    fn make_and_model_fold_for_grouping() {
        let a = normalize(&RawRecord { make: Some("Toyota ".into()), ..raw() }).unwrap();
        let b = normalize(&RawRecord { make: Some("toyota".into()), ..raw() }).unwrap();

        assert_eq!(a.make.folded(), b.make.folded());
        assert_eq!(a.make.display(), "Toyota");
        assert_eq!(b.make.display(), "toyota");
    }

    #[test]
    fn missing_make_is_empty_label() {
        let record = normalize(&RawRecord { make: None, ..raw() }).unwrap();
        assert!(record.make.is_empty());
    }

    #[test]
    fn raw_records_accept_numeric_years() {
        let raws = parse_raw_records(
            r#"[
                {"year": 2020, "make": "Toyota", "model": "Camry", "vin": "AAA1"},
                {"year": "2019", "make": "Honda", "model": "Civic", "vin": "BBB2", "source_url": "/b"},
                {"vin": "CCC3"}
            ]"#,
            "test",
        )
        .unwrap();

        assert_eq!(raws.len(), 3);
        assert_eq!(raws[0].year.as_deref(), Some("2020"));
        assert_eq!(raws[1].year.as_deref(), Some("2019"));
        assert_eq!(raws[2].year, None);
        assert_eq!(normalize(&raws[0]).unwrap().year, Some(2020));
    }

    #[test]
    fn malformed_input_names_its_origin() {
        let err = parse_raw_records("{not json", "today.json").unwrap_err();
        assert!(err.to_string().contains("today.json"));
    }

    #[test]
    fn url_falls_back_to_source_page() {
        let record = normalize(&RawRecord {
            url: Some("  ".into()),
            source_url: Some("https://dealer.example/inventory/a/b/2".into()),
            ..raw()
        })
        .unwrap();
        assert_eq!(record.url, "https://dealer.example/inventory/a/b/2");

        let record = normalize(&RawRecord { url: None, source_url: None, ..raw() }).unwrap();
        assert_eq!(record.url, "");
    }
}
