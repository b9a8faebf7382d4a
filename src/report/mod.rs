pub mod csv;
pub mod json;
pub mod table;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::run::RunOutcome;

/// Writes the CSV reports and prints the run summary to stdout.
///
/// Runs after the snapshot is saved, so a failure here leaves the day
/// stored without reports.
pub fn publish(outcome: &RunOutcome, config: &Config) -> Result<csv::ReportPaths> {
    let paths = csv::write_reports(&config.reports_dir, outcome).map_err(|source| Error::Publish {
        date: outcome.date,
        source: Box::new(source),
    })?;

    if config.json_output {
        println!("{}", json::render(outcome)?);
    } else {
        print!("{}", table::render(outcome));
        print_paths(&paths, config.verbose);
    }

    Ok(paths)
}

fn print_paths(paths: &csv::ReportPaths, verbose: bool) {
    if !verbose {
        return;
    }

    println!("\nreports:");
    for path in [&paths.inventory, &paths.added_by_group, &paths.removed_by_group, &paths.delta] {
        println!("  {}", path.display());
    }
}
