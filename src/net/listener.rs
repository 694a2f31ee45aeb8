//! Bound listeners.
//!
//! # Responsibilities
//! - Bind a listener for a resolved [`Address`]
//! - Remove a stale unix socket file left by a previous run before binding
//! - Report the concretely bound address (kernel-assigned port for `:0`)
//!
//! The listener is handed to the serve loop whole; unlinking the unix
//! socket file after shutdown is the server's job because the listener is
//! consumed by the accept loop.

use std::io;

use tokio::net::{TcpListener, UnixListener};

use crate::error::Error;
use crate::net::addr::Address;

/// A listener bound per the resolved scheme.
pub enum Bound {
    Tcp(TcpListener),
    Unix { listener: UnixListener, path: String },
}

impl Bound {
    /// Bind to `addr`.
    ///
    /// For unix addresses a stale socket file at the target path is
    /// removed first. Failures surface as [`Error::Bind`].
    pub async fn bind(addr: &Address) -> Result<Self, Error> {
        match addr {
            Address::Tcp { host, port } => {
                let bind_host = if host.is_empty() { "0.0.0.0" } else { host.as_str() };
                let listener = TcpListener::bind((bind_host, *port))
                    .await
                    .map_err(|source| Error::Bind {
                        addr: addr.to_string(),
                        source,
                    })?;
                Ok(Bound::Tcp(listener))
            }
            Address::Unix { path } => {
                if let Err(e) = std::fs::remove_file(path) {
                    if e.kind() != io::ErrorKind::NotFound {
                        return Err(Error::Bind {
                            addr: addr.to_string(),
                            source: e,
                        });
                    }
                }
                let listener = UnixListener::bind(path).map_err(|source| Error::Bind {
                    addr: addr.to_string(),
                    source,
                })?;
                Ok(Bound::Unix {
                    listener,
                    path: path.clone(),
                })
            }
        }
    }

    /// The address this listener is actually bound to.
    pub fn local_address(&self) -> io::Result<Address> {
        match self {
            Bound::Tcp(listener) => {
                let local = listener.local_addr()?;
                Ok(Address::Tcp {
                    host: local.ip().to_string(),
                    port: local.port(),
                })
            }
            Bound::Unix { path, .. } => Ok(Address::Unix { path: path.clone() }),
        }
    }
}
