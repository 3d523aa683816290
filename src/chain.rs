//! Handler chains as declared on a route, and their validation.
//!
//! A chain is written outermost-first and ends with the endpoint handler:
//!
//! ```rust
//! use mux::chain::{handler, middleware};
//! use mux::middleware::{from_fn, Next};
//! use mux::{Request, Response};
//!
//! async fn is_auth(req: Request, next: Next) -> Response { next.run(req).await }
//! async fn profile(_req: Request) -> &'static str { "me" }
//!
//! let links = [middleware(from_fn(is_auth)), handler(profile)];
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::{Handler, NamedHandler};
use crate::middleware::{BoxedMiddleware, Middleware};

/// One element of a handler chain.
#[derive(Clone)]
pub enum Link {
    Middleware(BoxedMiddleware),
    Handler(NamedHandler),
}

/// A middleware link.
pub fn middleware(m: impl Middleware) -> Link {
    Link::Middleware(Arc::new(m))
}

/// An endpoint handler link, named after the handler itself.
pub fn handler(h: impl Handler) -> Link {
    Link::Handler(NamedHandler::new(h))
}

/// An endpoint handler link with an explicit name.
pub fn named(name: impl Into<Cow<'static, str>>, h: impl Handler) -> Link {
    Link::Handler(NamedHandler::with_name(name, h))
}

/// Checks the shape of a chain and splits it into middlewares and endpoint.
///
/// Fails fast, before anything is compiled:
/// - [`Error::MissingHandler`] when `links` is empty;
/// - [`Error::UncallableMiddleware`] when a handler sits where a middleware
///   is expected, or the last link is not a handler.
pub fn validate(
    endpoint: &str,
    links: Vec<Link>,
) -> Result<(Vec<BoxedMiddleware>, NamedHandler), Error> {
    let last = links.len().checked_sub(1).ok_or_else(|| Error::MissingHandler {
        endpoint: endpoint.to_owned(),
    })?;

    let mut middlewares = Vec::with_capacity(last);
    let mut terminal = None;
    for (position, link) in links.into_iter().enumerate() {
        match (link, position == last) {
            (Link::Middleware(m), false) => middlewares.push(m),
            (Link::Handler(h), true) => terminal = Some(h),
            _ => {
                return Err(Error::UncallableMiddleware { endpoint: endpoint.to_owned(), position });
            }
        }
    }

    let terminal = terminal.ok_or_else(|| Error::MissingHandler { endpoint: endpoint.to_owned() })?;
    Ok((middlewares, terminal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Next, from_fn};
    use crate::request::Request;
    use crate::response::Response;

    async fn gate(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    async fn endpoint(_req: Request) -> &'static str {
        "ok"
    }

    #[test]
    fn empty_chain_is_missing_a_handler() {
        let err = validate("/login", Vec::new()).err().expect("chain should be rejected");
        assert!(matches!(err, Error::MissingHandler { endpoint } if endpoint == "/login"));
    }

    #[test]
    fn lone_middleware_cannot_terminate() {
        let err = validate("/login", vec![middleware(from_fn(gate))])
            .err()
            .expect("chain should be rejected");
        assert!(matches!(err, Error::UncallableMiddleware { position: 0, .. }));
    }

    #[test]
    fn handler_in_middleware_position_is_rejected() {
        let links = vec![middleware(from_fn(gate)), handler(endpoint), handler(endpoint)];
        let err = validate("/x", links).err().expect("chain should be rejected");
        assert!(matches!(err, Error::UncallableMiddleware { position: 1, .. }));
    }

    #[test]
    fn splits_middlewares_from_endpoint() {
        let links = vec![middleware(from_fn(gate)), middleware(from_fn(gate)), handler(endpoint)];
        let (middlewares, terminal) = validate("/x", links).unwrap();
        assert_eq!(middlewares.len(), 2);
        assert_eq!(terminal.name(), "endpoint");
    }

    #[test]
    fn single_handler_is_valid() {
        let (middlewares, terminal) = validate("/", vec![named("index", endpoint)]).unwrap();
        assert!(middlewares.is_empty());
        assert_eq!(terminal.name(), "index");
    }
}
