//! `tracing` subscriber setup.
//!
//! Logs go to stderr so they never interleave with the stage lines printed
//! on stdout. `RUST_LOG` always wins over the `-v`/`-q` flags.

use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directive for the given verbosity flags.
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Calling this twice is harmless; the
/// second call is ignored.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
