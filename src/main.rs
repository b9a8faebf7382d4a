use clap::Parser;
use lotwatch::aggregate::aggregate;
use lotwatch::cli::{Cli, Command};
use lotwatch::config::Config;
use lotwatch::normalize;
use lotwatch::report;
use lotwatch::run;
use lotwatch::store::diff;
use lotwatch::store::{SnapshotStore, SqliteStore};

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn open_store(config: &Config) -> SqliteStore {
    let store = match &config.database {
        Some(path) => SqliteStore::open(path).map_err(lotwatch::Error::from),
        None => SqliteStore::open_default(),
    };
    store.unwrap_or_else(|e| fail(format_args!("Error opening snapshot database: {e}")))
}

fn main() {
    let cli = Cli::parse();
    lotwatch::logging::init(cli.global.verbose);

    let config = Config::load(&cli.global).unwrap_or_else(|e| fail(e));

    match cli.command {
        Command::Run(args) => {
            let config = config.with_run_args(&args);
            // the only wall-clock read; the core works from the date it is given
            let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());

            let raws = normalize::read_raw_records(&args.input).unwrap_or_else(|e| fail(e));
            let mut store = open_store(&config);

            let outcome = match run::run_daily(&mut store, date, &raws, config.overwrite) {
                Ok(outcome) => outcome,
                Err(e) => fail(format_args!("Run for {date} failed: {e}")),
            };

            if let Err(e) = report::publish(&outcome, &config) {
                fail(e);
            }
        }
        Command::List(args) => {
            let store = open_store(&config);
            let snapshots = store
                .list()
                .unwrap_or_else(|e| fail(format_args!("Error listing snapshots: {e}")));

            if args.json {
                match serde_json::to_string_pretty(&snapshots) {
                    Ok(text) => println!("{text}"),
                    Err(e) => fail(e),
                }
            } else if snapshots.is_empty() {
                println!("No snapshots found. Run 'lotwatch run' to create one.");
            } else {
                println!("Snapshots:");
                println!("{:<12} {:>10}", "Date", "Vehicles");
                println!("{}", "-".repeat(23));
                for snapshot in snapshots {
                    println!("{:<12} {:>10}", snapshot.date.to_string(), snapshot.vehicles);
                }
            }
        }
        Command::Show(args) => {
            let store = open_store(&config);

            let date = match args.date {
                Some(date) => date,
                None => match store.list() {
                    Ok(snapshots) => match snapshots.first() {
                        Some(latest) => latest.date,
                        None => fail("No snapshots found. Run 'lotwatch run' to create one."),
                    },
                    Err(e) => fail(format_args!("Error listing snapshots: {e}")),
                },
            };

            match store.load(date) {
                Ok(Some(snapshot)) => print!("{}", report::table::render_inventory(&snapshot)),
                Ok(None) => fail(format_args!("Snapshot {date} not found")),
                Err(e) => fail(format_args!("Error loading snapshot {date}: {e}")),
            }
        }
        Command::Diff(args) => {
            let store = open_store(&config);

            let (from, to) = if let (Some(from), Some(to)) = (args.from, args.to) {
                (from, to)
            } else {
                match store.list() {
                    Ok(snapshots) => {
                        if snapshots.len() < 2 {
                            fail("Need at least 2 snapshots to compare. Run 'lotwatch run' on two different days.");
                        }
                        (snapshots[1].date, snapshots[0].date)
                    }
                    Err(e) => fail(format_args!("Error loading snapshots: {e}")),
                }
            };

            let load = |date: chrono::NaiveDate| match store.load(date) {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => fail(format_args!("Snapshot {date} not found")),
                Err(e) => fail(format_args!("Error loading snapshot {date}: {e}")),
            };
            let from_snapshot = load(from);
            let to_snapshot = load(to);

            let result = diff::diff(Some(&from_snapshot), &to_snapshot);
            let added = aggregate(&result.added);
            let removed = aggregate(&result.removed);

            if args.json {
                let value = serde_json::json!({
                    "from": from,
                    "to": to,
                    "added_by_group": added,
                    "removed_by_group": removed,
                    "delta": result.delta(),
                });
                match serde_json::to_string_pretty(&value) {
                    Ok(text) => println!("{text}"),
                    Err(e) => fail(e),
                }
            } else {
                print!("{}", report::table::render_comparison(&result, &added, &removed));
            }
        }
    }
}
