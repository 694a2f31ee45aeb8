//! Observability subsystem.
//!
//! The transport logs through `tracing`; this module only carries the
//! subscriber bootstrap for binaries and tests that have no subscriber
//! of their own. Embedding processes that already install one skip it.

pub mod logging;

pub use logging::init_logging;
