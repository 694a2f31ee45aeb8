//! RPC client: request construction and status-to-error translation.
//!
//! # Responsibilities
//! - Resolve the remote address once at construction
//! - Dial per request (TCP or unix socket) and speak HTTP/1.1
//! - Attach Basic credentials when configured
//! - Translate non-2xx statuses into [`Error::Status`]
//!
//! One connection per request, no pooling or multiplexing. The whole
//! dial-and-exchange is bounded by the configured timeout.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::header;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

use crate::config::ClientInfo;
use crate::error::Error;
use crate::net::addr::Address;
use crate::security::auth::Credentials;

/// RPC client for a server reachable over TCP or a unix domain socket.
///
/// The request path is passed as-is, query string included; build it
/// with `format!` when it carries parameters:
///
/// ```ignore
/// let body = client.get(&format!("/test/get?arg={}", 1)).await?;
/// ```
#[derive(Debug)]
pub struct Client {
    address: Address,
    auth_header: Option<String>,
    timeout: Duration,
}

impl Client {
    /// Build a client from `info`, resolving the address eagerly.
    ///
    /// When a username is configured, the Basic `Authorization` header
    /// is precomputed and attached to every request; an absent password
    /// is treated as empty.
    pub fn new(info: ClientInfo) -> Result<Self, Error> {
        let address = Address::resolve(&info.address)?;
        let auth_header = info.username.map(|username| {
            Credentials::new(username, info.password.unwrap_or_default()).to_basic()
        });
        Ok(Self {
            address,
            auth_header,
            timeout: Duration::from_secs(info.timeout_secs),
        })
    }

    /// Perform a GET. GET requests carry no body.
    pub async fn get(&self, path: &str) -> Result<Vec<u8>, Error> {
        self.request(Method::GET, path, &[]).await
    }

    /// Perform a PUT with `body`.
    pub async fn put(&self, body: &[u8], path: &str) -> Result<Vec<u8>, Error> {
        self.request(Method::PUT, path, body).await
    }

    /// Perform a POST with `body`.
    pub async fn post(&self, body: &[u8], path: &str) -> Result<Vec<u8>, Error> {
        self.request(Method::POST, path, body).await
    }

    /// Send one request and interpret the response.
    ///
    /// 2xx yields the raw response body (possibly empty). Non-2xx yields
    /// [`Error::Status`] with the body text as reason, falling back to
    /// the canonical status reason for an empty body. Local failures
    /// (dial, handshake, deadline) yield [`Error::Transport`].
    pub async fn request(&self, method: Method, path: &str, body: &[u8]) -> Result<Vec<u8>, Error> {
        match tokio::time::timeout(self.timeout, self.exchange(method, path, body)).await {
            Ok(result) => result,
            Err(elapsed) => Err(Error::transport(elapsed)),
        }
    }

    async fn exchange(&self, method: Method, path: &str, body: &[u8]) -> Result<Vec<u8>, Error> {
        let response = match &self.address {
            Address::Tcp { host, port } => {
                let host = if host.is_empty() { "127.0.0.1" } else { host.as_str() };
                let stream = TcpStream::connect((host, *port))
                    .await
                    .map_err(Error::transport)?;
                self.send(stream, format!("{host}:{port}"), method, path, body)
                    .await?
            }
            Address::Unix { path: socket } => {
                let stream = UnixStream::connect(socket).await.map_err(Error::transport)?;
                self.send(stream, "localhost".to_string(), method, path, body)
                    .await?
            }
        };

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(Error::transport)?
            .to_bytes();

        if !status.is_success() {
            let reason = if bytes.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            };
            return Err(Error::Status {
                code: status.as_u16(),
                reason,
            });
        }
        Ok(bytes.to_vec())
    }

    async fn send<S>(
        &self,
        stream: S,
        host: String,
        method: Method,
        path: &str,
        body: &[u8],
    ) -> Result<Response<Incoming>, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let io = TokioIo::new(stream);
        let (mut sender, conn) = http1::handshake::<_, Full<Bytes>>(io)
            .await
            .map_err(Error::transport)?;
        // The connection task owns the socket; it finishes once the
        // response body has been read or either side hangs up.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed");
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, host);
        if let Some(auth) = &self.auth_header {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = builder
            .body(Full::new(Bytes::copy_from_slice(body)))
            .map_err(Error::transport)?;

        sender.send_request(request).await.map_err(Error::transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_address() {
        let err = Client::new(ClientInfo::new("localhost:50050")).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn precomputes_auth_header() {
        let client = Client::new(ClientInfo::new("tcp://127.0.0.1:1").with_credentials("u", "p"))
            .unwrap();
        assert_eq!(client.auth_header.as_deref(), Some("Basic dTpw"));

        let client = Client::new(ClientInfo::new("tcp://127.0.0.1:1")).unwrap();
        assert!(client.auth_header.is_none());
    }

    #[tokio::test]
    async fn dial_failure_is_a_transport_error() {
        // port 1 on loopback is essentially never listening
        let client = Client::new(ClientInfo::new("tcp://127.0.0.1:1")).unwrap();
        let err = client.get("/x").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
