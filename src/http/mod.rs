//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP / unix socket connection
//!     → server.rs (accept, read body, auth gate)
//!     → [routing layer matches handler, builds Params]
//!     → server.rs (invoke handler, map result to status + body)
//!     → Send to client
//!
//! Client side:
//!     client.rs (dial, HTTP/1.1 exchange, status-to-error translation)
//! ```

pub mod client;
pub mod server;

pub use client::Client;
pub use server::Server;
