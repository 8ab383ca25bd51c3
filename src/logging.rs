use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a `tracing` filter directive, e.g. `mediasort=debug`.
pub const LOG_ENV_VAR: &str = "MEDIASORT_LOG";

/// Installs the global subscriber: formatted events on stderr, filtered by
/// `MEDIASORT_LOG` (default `info`, or `debug` when `verbose`).
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = env::var(LOG_ENV_VAR).unwrap_or_else(|_| default_filter.to_string());
    let filter_layer =
        EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Ignore the error raised when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter_layer)
        .try_init();
}
