//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "BUGHIVE_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Build the filter from `BUGHIVE_LOG`, falling back to `warn` when unset or
/// unparsable
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global fmt subscriber writing to stderr.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .try_init();
}
