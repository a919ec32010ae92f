//! Tracing setup: subscriber initialization, span definitions, and event types.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "DICTRANS_LOG";

/// Filter used when `DICTRANS_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "dictrans=info";

/// Initialize the tracing subscriber.
///
/// Reads `DICTRANS_LOG` for per-crate levels, e.g.
/// `DICTRANS_LOG=dictrans_engine=debug,dictrans_monitor=info`.
///
/// Idempotent. If another subscriber is already installed, this is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}

/// Initialize tracing with a custom filter string (for testing or embedding).
///
/// Emits JSON lines. Safe to call more than once; later calls are ignored.
pub fn init_tracing_with_filter(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init();
}
