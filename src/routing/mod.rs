//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (before start):
//!     (method, "/component/{name}", declared queries, handler)
//!     → template.rs (compile literal / placeholder segments)
//!     → router.rs (append to route table, duplicate-key check)
//!
//! Incoming request (method, path, query):
//!     → router.rs (scan routes in registration order)
//!     → template.rs (segment-exact match, placeholder captures)
//!     → Return: (handler, Params) or no match
//! ```

pub mod router;
pub mod template;

pub use router::{Handler, Params, Router};
pub use template::PathTemplate;
