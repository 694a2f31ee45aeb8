//! Basic authentication gate.
//!
//! # Responsibilities
//! - Decode `Authorization: Basic base64(user:pass)` request headers
//! - Run the injected checker predicate against the supplied pair
//!
//! The checker is an explicit capability passed to the server at
//! construction, not ambient state: callers substitute any predicate,
//! including ones backed by a credential store. It runs synchronously per
//! request and the server imposes no timeout on it, so a slow checker
//! throttles its own connection's processing.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Credential-checking predicate: `(username, password) → authorized`.
pub type Checker = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Wrap a plain closure as a [`Checker`].
pub fn checker<F>(f: F) -> Checker
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A username/password pair carried by a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Extract credentials from request headers.
    ///
    /// Returns `None` when the header is absent or malformed (non-Basic
    /// scheme, invalid base64, missing `:` separator); the gate treats
    /// all of those as unauthenticated.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        Self::from_basic(value)
    }

    /// Parse a `Basic <base64>` header value.
    pub fn from_basic(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("Basic") {
            return None;
        }
        let decoded = BASE64.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self::new(username, password))
    }

    /// Render the `Basic <base64>` header value for these credentials.
    pub fn to_basic(&self) -> String {
        let encoded = BASE64.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

/// Decide whether a request passes the gate.
///
/// Without a checker every request is authorized. With one, a request
/// must carry credentials the checker accepts.
pub fn authorize(checker: Option<&Checker>, credentials: Option<&Credentials>) -> bool {
    match checker {
        None => true,
        Some(check) => credentials.is_some_and(|c| check(&c.username, &c.password)),
    }
}
