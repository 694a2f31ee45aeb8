//! RPC server: lifecycle, dispatch pipeline, response mapping.
//!
//! # Responsibilities
//! - Validate the listen address at construction
//! - Collect route registrations before start
//! - Bind the listener (TCP or unix socket) and run the accept loop
//! - Per request: read body → auth gate → route match → handler → respond
//! - Close idempotently, unlinking the unix socket file
//!
//! The transport itself is a stateless dispatcher: nothing is shared
//! between requests. Handlers touching external mutable state bring
//! their own locking.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{request, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerInfo;
use crate::error::{BoxError, Error};
use crate::lifecycle::Shutdown;
use crate::net::addr::Address;
use crate::net::listener::Bound;
use crate::routing::{Params, Router as RpcRouter};
use crate::security::auth::{authorize, Checker, Credentials};

/// Cap on buffered request bodies. Control-plane payloads are small;
/// anything past this is rejected with 413.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// How long `close` waits for in-flight requests before aborting the
/// serve task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// State injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    router: Arc<RpcRouter>,
    checker: Option<Checker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Started,
    Closed,
}

/// RPC server over TCP or a unix domain socket.
///
/// Lifecycle: `Created → Started → Closed`. Routes are registered with
/// [`handle`](Server::handle) before [`start`](Server::start); once
/// started the route set is frozen. [`close`](Server::close) is
/// idempotent.
pub struct Server {
    address: Address,
    timeout: Duration,
    checker: Option<Checker>,
    router: RpcRouter,
    state: Lifecycle,
    shutdown: Shutdown,
    bound: Option<Address>,
    socket_path: Option<String>,
    serve_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("has_checker", &self.checker.is_some())
            .field("state", &self.state)
            .field("bound", &self.bound)
            .field("socket_path", &self.socket_path)
            .field("serving", &self.serve_task.is_some())
            .finish()
    }
}

impl Server {
    /// Create a not-yet-listening server.
    ///
    /// The address is resolved eagerly, so a malformed `info.address`
    /// fails here rather than at bind time. With `checker = None` every
    /// request is authorized.
    pub fn new(info: ServerInfo, checker: Option<Checker>) -> Result<Self, Error> {
        let address = Address::resolve(&info.address)?;
        Ok(Self {
            address,
            timeout: Duration::from_secs(info.timeout_secs),
            checker,
            router: RpcRouter::new(),
            state: Lifecycle::Created,
            shutdown: Shutdown::new(),
            bound: None,
            socket_path: None,
            serve_task: None,
        })
    }

    /// Register a handler for `(method, template)`.
    ///
    /// `queries` lists the query-parameter names the handler expects;
    /// they are read from the request's query string at dispatch time,
    /// independent of the path template. Registration after
    /// [`start`](Server::start) is rejected.
    pub fn handle<H>(
        &mut self,
        method: Method,
        template: &str,
        queries: &[&str],
        handler: H,
    ) -> Result<(), Error>
    where
        H: Fn(&Params, &[u8]) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        if self.state != Lifecycle::Created {
            return Err(Error::State("routes must be registered before start"));
        }
        self.router
            .register(method, template, queries, Arc::new(handler))
    }

    /// Bind the listener and begin accepting connections.
    ///
    /// Connections are served concurrently, one request in flight per
    /// connection. After a successful start the concretely bound address
    /// is available through [`address`](Server::address).
    pub async fn start(&mut self) -> Result<(), Error> {
        match self.state {
            Lifecycle::Created => {}
            Lifecycle::Started => return Err(Error::State("server already started")),
            Lifecycle::Closed => return Err(Error::State("server already closed")),
        }

        let bound = Bound::bind(&self.address).await?;
        let local = bound.local_address().map_err(|source| Error::Bind {
            addr: self.address.to_string(),
            source,
        })?;

        let state = AppState {
            router: Arc::new(std::mem::take(&mut self.router)),
            checker: self.checker.clone(),
        };
        let app = Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(self.timeout))
            .layer(TraceLayer::new_for_http());

        let signal = self.shutdown.notified();
        let task = match bound {
            Bound::Tcp(listener) => tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(signal)
                    .await
                {
                    tracing::error!(error = %e, "serve loop terminated");
                }
            }),
            Bound::Unix { listener, path } => {
                self.socket_path = Some(path);
                tokio::spawn(async move {
                    if let Err(e) = axum::serve(listener, app)
                        .with_graceful_shutdown(signal)
                        .await
                    {
                        tracing::error!(error = %e, "serve loop terminated");
                    }
                })
            }
        };

        tracing::info!(address = %local, "server listening");
        self.bound = Some(local);
        self.serve_task = Some(task);
        self.state = Lifecycle::Started;
        Ok(())
    }

    /// The concretely bound address, available once started.
    ///
    /// For `tcp://…:0` this carries the kernel-assigned port, so tests
    /// and peers can connect to it.
    pub fn address(&self) -> Option<&Address> {
        self.bound.as_ref()
    }

    /// Stop accepting connections and release the listener.
    ///
    /// In-flight requests get a bounded grace period to drain; the serve
    /// task is aborted afterwards. For unix sockets the socket file is
    /// removed; removal failures are logged, not returned, since the
    /// resource is being torn down anyway. Calling `close` again (or
    /// before `start`) is a no-op.
    pub async fn close(&mut self) {
        if self.state == Lifecycle::Closed {
            return;
        }
        self.state = Lifecycle::Closed;
        self.shutdown.trigger();

        if let Some(mut task) = self.serve_task.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
                tracing::warn!("serve loop did not drain in time, aborting");
                task.abort();
            }
        }

        if let Some(path) = self.socket_path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path, error = %e, "failed to remove socket file");
                }
            }
        }
        tracing::info!("server closed");
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        // Unblocks the accept loop if the owner never called close; the
        // unix socket file, if any, is left for the next bind to clear.
        self.shutdown.trigger();
    }
}

/// Per-request failure, mapped to a response status and body.
enum DispatchError {
    Unauthorized,
    NoRoute,
    Handler(BoxError),
    BodyTooLarge,
}

impl DispatchError {
    fn status(&self) -> StatusCode {
        match self {
            DispatchError::Unauthorized => StatusCode::UNAUTHORIZED,
            DispatchError::NoRoute => StatusCode::NOT_FOUND,
            DispatchError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn message(&self) -> String {
        match self {
            DispatchError::Unauthorized => "account unauthorized".to_string(),
            DispatchError::NoRoute => "no matching route".to_string(),
            DispatchError::Handler(e) => e.to_string(),
            DispatchError::BodyTooLarge => "request body too large".to_string(),
        }
    }
}

/// Catch-all request handler: every path funnels through the transport's
/// own router, not axum's.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let result = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => handle_request(&state, &parts, &bytes),
        Err(_) => Err(DispatchError::BodyTooLarge),
    };

    match result {
        Ok(bytes) => {
            tracing::debug!(method = %method, path = %path, "request handled");
            (StatusCode::OK, bytes).into_response()
        }
        Err(e) => {
            let status = e.status();
            let message = e.message();
            tracing::warn!(method = %method, path = %path, status = %status, error = %message, "request rejected");
            (status, message).into_response()
        }
    }
}

fn handle_request(
    state: &AppState,
    parts: &request::Parts,
    body: &[u8],
) -> Result<Vec<u8>, DispatchError> {
    let credentials = Credentials::from_headers(&parts.headers);
    if !authorize(state.checker.as_ref(), credentials.as_ref()) {
        return Err(DispatchError::Unauthorized);
    }

    let (handler, params) = state
        .router
        .match_request(&parts.method, parts.uri.path(), parts.uri.query())
        .ok_or(DispatchError::NoRoute)?;

    handler(&params, body).map_err(DispatchError::Handler)
}
