//! Log setup. Logs go to stderr so `--json` output on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `-v`.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "lotwatch=debug" } else { "lotwatch=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
