use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveDate;
use tempfile::TempDir;

use lotwatch::store::{SnapshotStore, SqliteStore};
use lotwatch::{Label, Snapshot, StoreError, VehicleRecord};

const WRITERS: usize = 8;
const VEHICLES: usize = 500;

fn fleet(date: NaiveDate) -> Snapshot {
    let records = (0..VEHICLES).map(|i| VehicleRecord {
        year: Some(2015 + (i % 10) as i32),
        make: Label::new("Toyota"),
        model: Label::new(if i % 2 == 0 { "Camry" } else { "Corolla" }),
        vin: format!("VIN{i:05}"),
        url: format!("https://dealer.example/inventory/{i}"),
    });
    Snapshot::from_records(date, records).0
}

#[test]
fn concurrent_saves_for_one_date_store_exactly_once() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("lot.db");
    let date = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();

    // schema exists before the writers race
    drop(SqliteStore::open(&db).unwrap());

    let snapshot = Arc::new(fleet(date));
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let db = db.clone();
            let snapshot = Arc::clone(&snapshot);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut store = SqliteStore::open(&db).unwrap();
                barrier.wait();
                store.save(&snapshot, false)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let saved = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::DuplicateSnapshot(d)) if *d == date))
        .count();
    assert_eq!(saved, 1, "results: {results:?}");
    assert_eq!(duplicates, WRITERS - 1, "results: {results:?}");

    let store = SqliteStore::open(&db).unwrap();
    let stored = store.load(date).unwrap().unwrap();
    assert_eq!(stored.len(), VEHICLES);
    assert_eq!(stored, *snapshot);
    assert_eq!(store.list().unwrap().len(), 1);
    assert_eq!(store.list().unwrap()[0].vehicles, VEHICLES);
}
