use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lotwatch")]
#[command(about = "Daily dealership inventory snapshots and change reports")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Config file (defaults to <config dir>/lotwatch/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot database path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture today's snapshot, diff it against the previous one and write reports
    Run(RunArgs),

    /// List stored snapshots
    List(ListArgs),

    /// Display a stored snapshot (latest by default)
    Show(ShowArgs),

    /// Compare two stored snapshots
    Diff(DiffArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// JSON array of extracted vehicle records ('-' reads stdin)
    #[arg(long)]
    pub input: PathBuf,

    /// Reference date of this run, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Directory for CSV reports
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// Replace an existing snapshot for the same date
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Snapshot date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Earlier snapshot date
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Later snapshot date
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
