//! Diagnostic logging for the shell binary.
//!
//! Logs go to stderr so they never mix with result tables on stdout. The
//! filter is read from `SQLSH_LOG` using `tracing-subscriber`'s `EnvFilter`
//! syntax (`debug`, `sqlsh_sqlite=trace,warn`, ...). Without it only
//! warnings are shown.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SQLSH_LOG";

/// Filter used when `SQLSH_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Build a filter from a directive string, falling back to
/// [`DEFAULT_FILTER`].
pub fn build_filter(directives: Option<&str>) -> EnvFilter {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("sqlsh: ignoring invalid {LOG_ENV} ({e}); using '{DEFAULT_FILTER}'");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::new(DEFAULT_FILTER),
    }
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logging() {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(directives.as_deref());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
