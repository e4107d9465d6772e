pub use tracing::{debug, error, info, warn, trace, instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Installs the global subscriber, falling back to `default_filter` when `RUST_LOG`
/// is not set. Span close events (with their busy/idle time) are only printed when
/// debug output is enabled, which is how per-scale estimation timings surface.
pub fn init_with_default(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let is_debug = env_filter.to_string().contains("debug")
        || env_filter.to_string().contains("trace");

    let fmt_layer = fmt::layer()
        .with_target(is_debug)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    // A second init (e.g. from tests) must not abort the process.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
