//! Route set and dispatch lookup.
//!
//! # Responsibilities
//! - Store registered routes (append-only, keyed by method + template)
//! - Reject duplicate keys and malformed templates at registration
//! - Look up the handler for (method, path) and build its [`Params`]
//!
//! Path templating and query-parameter declaration are independent
//! concerns registered side by side: the template matches the path, the
//! declared names are read from the query string at dispatch time. First
//! registered match wins.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use url::form_urlencoded;

use crate::error::{BoxError, Error};
use crate::routing::template::PathTemplate;

/// Per-request parameters visible to a handler.
///
/// Populated from declared query parameters and path placeholder
/// captures; captures win on name collision. Lives for one request.
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, name: String, value: String) {
        self.0.insert(name, value);
    }
}

/// User-supplied request handler: `(params, request body) → response body`.
///
/// Invoked exactly once per matched, authorized request, synchronously on
/// the connection's task; a slow handler throttles only its own
/// connection. Errors map to a 500 response carrying the error message.
pub type Handler = Arc<dyn Fn(&Params, &[u8]) -> Result<Vec<u8>, BoxError> + Send + Sync>;

struct Route {
    method: Method,
    template: PathTemplate,
    queries: Vec<String>,
    handler: Handler,
}

/// The transport's route table.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `(method, template)` with its declared
    /// query parameter names.
    ///
    /// Fails on a malformed template or a duplicate `(method, template)`
    /// key. Two routes differing only by method are independent.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        queries: &[&str],
        handler: Handler,
    ) -> Result<(), Error> {
        let template = PathTemplate::compile(template)?;
        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.template.raw() == template.raw())
        {
            return Err(Error::Route(format!(
                "duplicate route {method} {}",
                template.raw()
            )));
        }
        self.routes.push(Route {
            method,
            template,
            queries: queries.iter().map(|q| q.to_string()).collect(),
            handler,
        });
        Ok(())
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Look up the handler for a request.
    ///
    /// On a match, returns the handler and its [`Params`]: declared query
    /// parameters first (percent-decoded, missing ones simply absent),
    /// then path captures, which override on collision. Undeclared query
    /// parameters are ignored.
    pub fn match_request(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Option<(Handler, Params)> {
        for route in self.routes.iter().filter(|r| &r.method == method) {
            let Some(captures) = route.template.matches(path) else {
                continue;
            };

            let mut params = Params::default();
            if let Some(query) = query {
                for (name, value) in form_urlencoded::parse(query.as_bytes()) {
                    if route.queries.iter().any(|q| q == &*name) {
                        params.insert(name.into_owned(), value.into_owned());
                    }
                }
            }
            for (name, value) in captures {
                params.insert(name, value);
            }
            return Some((Arc::clone(&route.handler), params));
        }
        None
    }
}
