//! Middleware layer.
//!
//! A middleware receives "the rest of the chain" as [`Next`] and answers with
//! a [`Step`]:
//!
//! - [`Step::Continue`] carries the handler that takes over this position in
//!   the chain. It usually wraps `next`, inspects the request and either
//!   calls `next.run(req)` or answers on its own.
//! - [`Step::Respond`] ends the chain with a fixed response. Middlewares
//!   further out still get to run first; everything further in never runs.
//!
//! Most middlewares are request gates and are easiest to write as an async
//! function passed to [`from_fn`]:
//!
//! ```rust
//! use mux::middleware::{self, Next};
//! use mux::{IntoResponse, Json, Request, Response, StatusCode};
//! use serde_json::json;
//!
//! async fn is_auth(req: Request, next: Next) -> Response {
//!     if req.header("authorization").is_none() {
//!         let body = json!({ "success": false, "message": "unauthorized access" });
//!         return (Json(body), StatusCode::UNAUTHORIZED).into_response();
//!     }
//!     next.run(req).await
//! }
//!
//! let gate = middleware::from_fn(is_auth);
//! ```

mod compose;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub use compose::compile;

/// The rest of a handler chain, as seen from one middleware.
#[derive(Clone)]
pub struct Next(BoxedHandler);

impl Next {
    pub(crate) fn new(handler: BoxedHandler) -> Self {
        Self(handler)
    }

    /// Hands the request to the next middleware, or to the endpoint handler
    /// when this was the innermost middleware.
    pub async fn run(self, req: Request) -> Response {
        self.0.call(req).await
    }

    /// The underlying handler, for middlewares that want to pass it on as-is.
    pub fn into_handler(self) -> BoxedHandler {
        self.0
    }
}

/// What a middleware does with its position in the chain.
pub enum Step {
    /// Keep going through the given handler.
    Continue(BoxedHandler),
    /// Stop and answer with this response.
    ///
    /// The response is built inside `wrap`, while the chain is assembled for
    /// a request and before any outer middleware has looked at it. Keep
    /// request-time side effects in a `Continue` handler.
    Respond(Response),
}

impl Step {
    /// Continue through `handler`.
    pub fn proceed(handler: impl Handler) -> Self {
        Self::Continue(handler.into_boxed_handler())
    }

    /// Stop with `res`.
    pub fn respond(res: impl IntoResponse) -> Self {
        Self::Respond(res.into_response())
    }
}

/// A composable request-handling step.
///
/// `wrap` is called once per request while the chain is assembled, so it
/// must not rely on state left behind by earlier requests.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: Next) -> Step;
}

/// A type-erased middleware shared by every request on a route.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Adapts `async fn(Request, Next) -> impl IntoResponse` into a [`Middleware`].
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FromFn(Arc::new(f))
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F>(Arc<F>);

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn wrap(&self, next: Next) -> Step {
        let f = Arc::clone(&self.0);
        Step::proceed(move |req: Request| {
            let fut = (*f)(req, next.clone());
            async move { fut.await.into_response() }
        })
    }
}
