//! Tracing initialization: JSON lines on stdout, `RUST_LOG`-filtered.
//!
//! Transition commits, fan-out summaries and roster overrides all log through
//! the subscriber installed here. Call once from the composition root; test
//! harnesses call it with a quiet default instead.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber with an `info` default level.
///
/// Idempotent: later calls are no-ops.
pub fn init() {
    init_with_default("info");
}

/// Install the subscriber, falling back to `default_filter` when `RUST_LOG`
/// is unset or unparsable.
pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_a_no_op() {
        init_with_default("warn");
        init_with_default("debug");
        init();
    }
}
