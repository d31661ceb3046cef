//! Logging infrastructure for the focus timer.
//!
//! Log lines go to stderr so they never share a line with the countdown
//! on stdout. RUST_LOG overrides whatever level the caller picks.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Quiet by default: only problems with persistence, sound or notifications
const QUIET_DIRECTIVES: &str = "warn";

/// Everything both crates have to say
const VERBOSE_DIRECTIVES: &str = "warn,focus_core=debug,focus=debug";

/// Filter directives for the CLI's `--verbose` flag
pub fn directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_DIRECTIVES
    } else {
        QUIET_DIRECTIVES
    }
}

/// Initialize logging for the CLI
pub fn init(verbose: bool) {
    init_with_level(directives(verbose))
}

/// Initialize logging with specific default directives
///
/// # Arguments
/// * `default_level` - A level (debug, info, warn, error) or EnvFilter directives
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from a test harness) is not fatal.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
