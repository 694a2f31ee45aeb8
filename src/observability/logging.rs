//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Respect `RUST_LOG`-style env filtering, with a quiet default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a formatting subscriber with env-filter support.
///
/// Level defaults to `ctl_rpc=info` when the environment does not say
/// otherwise. Calling this when a subscriber is already installed is a
/// no-op, so tests can call it unconditionally.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctl_rpc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
