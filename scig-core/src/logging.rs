//! Crate-standard logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber with the given verbosity.
///
/// `verbosity` accepts anything `EnvFilter` understands (`info`, `debug`,
/// `scig_gen=trace`, ...); unparseable input falls back to `info`.
///
/// Must be called at most once per process; library code and tests should
/// never call this.
pub fn setup(verbosity: &str) {
    let filter = EnvFilter::try_new(verbosity).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
