//! Server and client connection settings.
//!
//! These are plain data structs the caller fills in (or deserializes as
//! part of its own configuration). Loading and validating configuration
//! files is the consumer's concern; the transport only resolves the
//! address strings at construction time.

use serde::{Deserialize, Serialize};

fn default_timeout_secs() -> u64 {
    30
}

/// Settings for a [`Server`](crate::Server).
///
/// Immutable once the server has started.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerInfo {
    /// Listen address, `tcp://host:port` or `unix:///path/to.sock`.
    pub address: String,

    /// Per-request deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:50050".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerInfo {
    /// Settings listening on `address` with default timeouts.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

/// Settings for a [`Client`](crate::Client).
///
/// Credentials are optional; when both are absent no `Authorization`
/// header is sent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientInfo {
    /// Remote address, `tcp://host:port` or `unix:///path/to.sock`.
    pub address: String,

    /// Basic auth username.
    pub username: Option<String>,

    /// Basic auth password.
    pub password: Option<String>,

    /// Deadline in seconds covering dial plus exchange, per request.
    pub timeout_secs: u64,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:50050".to_string(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientInfo {
    /// Settings targeting `address` without credentials.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Attach Basic auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let info: ServerInfo = serde_json::from_str(r#"{"address":"tcp://:0"}"#).unwrap();
        assert_eq!(info.address, "tcp://:0");
        assert_eq!(info.timeout_secs, 30);

        let info: ClientInfo = serde_json::from_str("{}").unwrap();
        assert!(info.username.is_none());
        assert_eq!(info.timeout_secs, 30);
    }

    #[test]
    fn with_credentials_sets_both() {
        let info = ClientInfo::new("tcp://127.0.0.1:80").with_credentials("u", "p");
        assert_eq!(info.username.as_deref(), Some("u"));
        assert_eq!(info.password.as_deref(), Some("p"));
    }
}
