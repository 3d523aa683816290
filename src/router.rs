//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router knows nothing
//! about groups or middleware: it is handed finished handlers, by
//! [`Router::on`] or through [`RuleSink::add_rule`], and dispatches to them.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::{InsertError, Router as MatchitRouter};
use tracing::warn;

use crate::error::Error;
use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// Anything a mounted rule can be registered with.
pub trait RuleSink {
    /// Registers `handler` under `path` for each of `methods`, identified by
    /// `name`.
    fn add_rule(
        &mut self,
        path: &str,
        name: &str,
        handler: BoxedHandler,
        methods: &[Method],
    ) -> Result<(), Error>;
}

/// The application router.
///
/// Build it once at startup, directly with [`Router::on`] or through a
/// [`Mux`](crate::Mux), then pass it to [`Server::serve`](crate::Server::serve).
///
/// Registering the same path and method again replaces the earlier handler.
/// Overlapping templates such as `/users/{id}` and `/users/{name}` are
/// rejected with [`Error::Route`].
#[derive(Clone)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    names: HashMap<String, String>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), names: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is invalid or conflicts with an existing route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.insert(method, path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    fn insert(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        insert_into(self.routes.entry(method).or_default(), method, path, handler)
    }

    /// The path registered under a rule name, if any.
    pub fn path_for(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Methods with a route matching `path`, in a stable order.
    pub(crate) fn allowed(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| *method)
            .collect();
        methods.sort_unstable();
        methods
    }

    /// Dispatches one request in-process.
    ///
    /// `404 Not Found` when no method has the path, `405 Method Not Allowed`
    /// (with an `allow` header) when only other methods do.
    pub async fn call(&self, req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => handler.call(req.with_params(params)).await,
            None => self.miss(req.path()),
        }
    }

    pub(crate) fn miss(&self, path: &str) -> Response {
        let allowed = self.allowed(path);
        if allowed.is_empty() {
            return Response::status(StatusCode::NOT_FOUND);
        }
        let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("allow", &allow)
            .no_body()
    }
}

impl RuleSink for Router {
    fn add_rule(
        &mut self,
        path: &str,
        name: &str,
        handler: BoxedHandler,
        methods: &[Method],
    ) -> Result<(), Error> {
        // Insert into copies so a rejected method leaves every tree as it was.
        let mut staged: HashMap<Method, MatchitRouter<BoxedHandler>> = HashMap::new();
        for &method in methods {
            let tree = staged
                .entry(method)
                .or_insert_with(|| self.routes.get(&method).cloned().unwrap_or_default());
            insert_into(tree, method, path, Arc::clone(&handler))?;
        }
        self.routes.extend(staged);

        match self.names.get(name) {
            Some(existing) if existing != path => {
                warn!(
                    name,
                    existing = %existing,
                    path,
                    "rule name already registered, keeping the first"
                );
            }
            Some(_) => {}
            None => {
                self.names.insert(name.to_owned(), path.to_owned());
            }
        }
        Ok(())
    }
}

fn insert_into(
    tree: &mut MatchitRouter<BoxedHandler>,
    method: Method,
    path: &str,
    handler: BoxedHandler,
) -> Result<(), Error> {
    let inserted = match tree.insert(path, Arc::clone(&handler)) {
        Err(InsertError::Conflict { with }) if with == path => {
            warn!(%method, path, "route already registered, replacing the earlier handler");
            tree.remove(path);
            tree.insert(path, handler)
        }
        other => other,
    };
    inserted.map_err(|source| Error::Route { path: path.to_owned(), source })
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
