//! Error taxonomy for the transport.
//!
//! Construction-time failures (`InvalidAddress`, `Bind`, `Route`, `State`)
//! abort setup and are returned to the caller. Per-request failures on the
//! server side never surface here; they become HTTP responses. The client
//! reports remote failures as `Status` and local ones as `Transport`.

use std::io;

use thiserror::Error;

/// Boxed error type used by handlers and as a transport error cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience result alias for fallible transport APIs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the transport.
#[derive(Debug, Error)]
pub enum Error {
    /// The address string is malformed or uses an unsupported scheme.
    #[error("invalid address `{addr}`: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Listener creation failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Route registration failed (bad template or duplicate key).
    #[error("route error: {0}")]
    Route(String),

    /// Lifecycle misuse, e.g. registering routes after start.
    #[error("invalid server state: {0}")]
    State(&'static str),

    /// Client-side connect, handshake, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The remote answered with a non-2xx status.
    #[error("[{code}] {reason}")]
    Status { code: u16, reason: String },
}

impl Error {
    pub(crate) fn invalid_address(addr: &str, reason: impl Into<String>) -> Self {
        Error::InvalidAddress {
            addr: addr.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(cause: impl Into<BoxError>) -> Self {
        Error::Transport(cause.into())
    }
}
