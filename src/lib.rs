//! HTTP-shaped RPC transport between a control master and its managed
//! components.
//!
//! A [`Server`] listens on a TCP socket or a filesystem-backed unix
//! domain socket (`tcp://host:port` / `unix:///path.sock`), dispatches
//! requests through an optional Basic-auth gate and a templated path
//! router, and hands opaque byte bodies to registered handlers. A
//! [`Client`] targets the same address syntax and translates non-2xx
//! responses into structured errors.
//!
//! ```ignore
//! let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None)?;
//! server.handle(Method::GET, "/component/{name}/stats", &[], |params, _body| {
//!     Ok(params.get("name").unwrap_or_default().as_bytes().to_vec())
//! })?;
//! server.start().await?;
//!
//! let client = Client::new(ClientInfo::new(server.address().unwrap().to_string()))?;
//! let body = client.get("/component/broker/stats").await?;
//! ```

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use axum::http::Method;

pub use config::{ClientInfo, ServerInfo};
pub use error::{BoxError, Error};
pub use http::{Client, Server};
pub use net::{Address, Scheme};
pub use routing::Params;
pub use security::{checker, Checker, Credentials};
