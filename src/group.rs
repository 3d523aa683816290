//! Route groups: routes declared together, mounted together.

use tracing::debug;

use crate::chain::{self, Link};
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler, NamedHandler};
use crate::method::Method;
use crate::middleware::compile;

/// One declared endpoint: a path pattern, the methods it answers, and its
/// compiled handler chain.
#[derive(Clone)]
pub struct Route {
    endpoint: String,
    methods: Vec<Method>,
    composed: BoxedHandler,
    raw: NamedHandler,
}

impl Route {
    /// The path pattern, exactly as declared.
    pub fn endpoint(&self) -> &str { &self.endpoint }
    pub fn methods(&self) -> &[Method] { &self.methods }
    /// The middleware chain composed around the endpoint handler.
    pub fn handler(&self) -> &BoxedHandler { &self.composed }
    /// The endpoint handler on its own, with its declared name.
    pub fn raw(&self) -> &NamedHandler { &self.raw }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("endpoint", &self.endpoint)
            .field("methods", &self.methods)
            .field("handler", &self.raw.name())
            .finish()
    }
}

/// An append-only list of routes for one namespace, e.g. everything under
/// `/auth`. Hand it to [`Mux::mount`](crate::Mux::mount) to serve it.
///
/// ```rust
/// use mux::chain::{handler, middleware};
/// use mux::middleware::{from_fn, Next};
/// use mux::{Group, Request, Response};
///
/// async fn is_auth(req: Request, next: Next) -> Response { next.run(req).await }
/// async fn login(_req: Request) -> &'static str { "welcome" }
/// async fn logout(_req: Request) -> &'static str { "bye" }
///
/// # fn main() -> Result<(), mux::Error> {
/// let mut auth = Group::new();
/// auth.post("/login", [handler(login)])?
///     .get("/logout", [middleware(from_fn(is_auth)), handler(logout)])?;
/// assert_eq!(auth.routes().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Group {
    routes: Vec<Route>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `endpoint` for `methods` with a handler chain, outermost
    /// middleware first and the endpoint handler last.
    ///
    /// The chain is validated before it is compiled. An empty method set
    /// means `GET`. Nothing is deduplicated: declaring the same endpoint and
    /// method twice adds two routes.
    pub fn declare(
        &mut self,
        endpoint: &str,
        methods: &[Method],
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        let (middlewares, raw) = chain::validate(endpoint, links.into_iter().collect())?;

        let mut methods = methods.to_vec();
        if methods.is_empty() {
            methods.push(Method::Get);
        }
        methods.sort_unstable();
        methods.dedup();

        debug!(
            endpoint,
            methods = ?methods,
            middlewares = middlewares.len(),
            handler = raw.name(),
            "route declared"
        );

        let composed = compile(raw.handler().clone(), middlewares);
        self.routes.push(Route { endpoint: endpoint.to_owned(), methods, composed, raw });
        Ok(self)
    }

    pub fn get(
        &mut self,
        endpoint: &str,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, &[Method::Get], links)
    }

    pub fn post(
        &mut self,
        endpoint: &str,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, &[Method::Post], links)
    }

    pub fn put(
        &mut self,
        endpoint: &str,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, &[Method::Put], links)
    }

    pub fn patch(
        &mut self,
        endpoint: &str,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, &[Method::Patch], links)
    }

    pub fn delete(
        &mut self,
        endpoint: &str,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, &[Method::Delete], links)
    }

    /// Declares the chain for every method in [`Method::ANY`].
    pub fn handle(
        &mut self,
        endpoint: &str,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, &Method::ANY, links)
    }

    /// Registers a single handler, no middleware, for `methods`.
    pub fn route(
        &mut self,
        endpoint: &str,
        methods: &[Method],
        h: impl Handler,
    ) -> Result<&mut Self, Error> {
        self.declare(endpoint, methods, [chain::handler(h)])
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chain::{handler, middleware, named};
    use crate::middleware::{Next, from_fn};
    use crate::request::Request;
    use crate::response::Response;

    async fn gate(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    async fn index(_req: Request) -> &'static str {
        "index"
    }

    #[test]
    fn convenience_methods_fix_the_method_set() {
        let mut group = Group::new();
        group
            .get("/a", [handler(index)]).unwrap()
            .post("/a", [handler(index)]).unwrap()
            .put("/a", [handler(index)]).unwrap()
            .patch("/a", [handler(index)]).unwrap()
            .delete("/a", [handler(index)]).unwrap()
            .handle("/b", [handler(index)]).unwrap();

        let methods: Vec<_> = group.routes().iter().map(|r| r.methods().to_vec()).collect();
        assert_eq!(methods[..5], [
            vec![Method::Get],
            vec![Method::Post],
            vec![Method::Put],
            vec![Method::Patch],
            vec![Method::Delete],
        ]);
        assert_eq!(methods[5].len(), Method::ANY.len());
    }

    #[test]
    fn empty_method_set_defaults_to_get() {
        let mut group = Group::new();
        group.route("/", &[], index).unwrap();
        assert_eq!(group.routes()[0].methods(), [Method::Get]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut group = Group::new();
        group.get("/a", [handler(index)]).unwrap().get("/a", [handler(index)]).unwrap();
        assert_eq!(group.routes().len(), 2);
    }

    #[test]
    fn endpoint_is_stored_verbatim() {
        let mut group = Group::new();
        group.get("login/", [named("login", index)]).unwrap();
        assert_eq!(group.routes()[0].endpoint(), "login/");
        assert_eq!(group.routes()[0].raw().name(), "login");
    }

    #[test]
    fn invalid_chain_leaves_group_untouched() {
        let mut group = Group::new();
        assert!(matches!(group.get("/a", []), Err(Error::MissingHandler { .. })));
        assert!(matches!(
            group.get("/a", [middleware(from_fn(gate))]),
            Err(Error::UncallableMiddleware { position: 0, .. })
        ));
        assert!(group.routes().is_empty());
    }

    #[test]
    fn plain_route_is_not_wrapped() {
        let mut group = Group::new();
        group.get("/", [handler(index)]).unwrap();
        let route = &group.routes()[0];
        assert!(Arc::ptr_eq(route.handler(), route.raw().handler()));
    }

    #[test]
    fn chained_route_is_composed() {
        let mut group = Group::new();
        group.get("/", [middleware(from_fn(gate)), handler(index)]).unwrap();
        let route = &group.routes()[0];
        assert!(!Arc::ptr_eq(route.handler(), route.raw().handler()));
    }
}
