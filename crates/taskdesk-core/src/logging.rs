//! Structured logging bootstrap.
//!
//! Library crates only emit `tracing` events. Binaries call
//! [`init_subscriber`] once at startup to route them to stderr.

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a configured level is usable.
pub const DEFAULT_LEVEL: &str = "warn";

/// Initialize the global tracing subscriber with compact stderr output.
///
/// `RUST_LOG` takes precedence over `level`. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init fails if a global subscriber is already set
    let _ = subscriber.try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
