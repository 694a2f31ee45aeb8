//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! "tcp://host:port" or "unix:///path.sock"
//!     → addr.rs (resolve scheme + target, pure parsing)
//!     → listener.rs (bind, stale socket cleanup, bound address)
//!     → Hand off to HTTP layer
//! ```

pub mod addr;
pub mod listener;

pub use addr::{Address, Scheme};
