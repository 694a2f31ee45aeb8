//! Address resolution.
//!
//! # Responsibilities
//! - Parse `scheme://target` strings into a transport kind and target
//! - Validate `host:port` targets for `tcp`
//! - Normalize filesystem paths for `unix` so equal inputs compare equal
//!
//! Resolution is pure parsing: the resolver never touches the filesystem
//! or the network. Socket lifecycle (bind, stale-file removal, unlink on
//! close) belongs to the server.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Transport kind identified by an address prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tcp,
    Unix,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Tcp => "tcp",
            Scheme::Unix => "unix",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved transport address.
///
/// `Display` renders the canonical `scheme://target` form, so a resolved
/// address round-trips through [`Address::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// TCP endpoint. An empty host means all interfaces when binding and
    /// loopback when dialing; port `0` asks the kernel for a free port.
    Tcp { host: String, port: u16 },
    /// Unix domain socket endpoint at a filesystem path.
    Unix { path: String },
}

impl Address {
    /// Parse a `scheme://target` address string.
    ///
    /// Recognized schemes are `tcp` (target `host:port`) and `unix`
    /// (target = socket file path). Anything else fails with
    /// [`Error::InvalidAddress`].
    pub fn resolve(addr: &str) -> Result<Self, Error> {
        let (scheme, target) = addr
            .split_once("://")
            .ok_or_else(|| Error::invalid_address(addr, "missing `scheme://` prefix"))?;

        match scheme {
            "tcp" => {
                let (host, port) = target
                    .rsplit_once(':')
                    .ok_or_else(|| Error::invalid_address(addr, "tcp target must be host:port"))?;
                if host.contains('/') {
                    return Err(Error::invalid_address(addr, "tcp host must not contain `/`"));
                }
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::invalid_address(addr, format!("invalid port `{port}`")))?;
                Ok(Address::Tcp {
                    host: host.to_string(),
                    port,
                })
            }
            "unix" => {
                if target.is_empty() {
                    return Err(Error::invalid_address(addr, "unix target must be a path"));
                }
                Ok(Address::Unix {
                    path: normalize_path(target),
                })
            }
            other => Err(Error::invalid_address(
                addr,
                format!("unsupported scheme `{other}`"),
            )),
        }
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            Address::Tcp { .. } => Scheme::Tcp,
            Address::Unix { .. } => Scheme::Unix,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Address::Unix { path } => write!(f, "unix://{path}"),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Address::resolve(s)
    }
}

/// Collapse separator runs and trailing separators so that two spellings
/// of the same socket path produce the same target.
fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(c);
    }
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
