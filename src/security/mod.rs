//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (decode Basic credentials, run injected checker)
//!     → authorized: pass to routing
//!     → rejected: fixed 401 response, handler never runs
//! ```

pub mod auth;

pub use auth::{authorize, checker, Checker, Credentials};
