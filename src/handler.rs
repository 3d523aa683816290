//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A route group holds handlers *and* composed middleware chains of different
//! concrete types side by side, and the router stores whatever the group hands
//! it. Rust collections can only hold one concrete type, so everything goes
//! behind a **trait object** (`dyn ErasedHandler`):
//!
//! ```text
//! async fn login(req: Request) -> Json<Value> { … }   ← user writes this
//!        ↓ group.post("/login", [handler(login)])
//! login.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(login))                          ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time                  ← one vtable dispatch
//! ```
//!
//! Composed chains implement [`ErasedHandler`] too, so the router never knows
//! whether it is calling a bare handler or a middleware stack.

use std::any::type_name;
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Dispatch interface shared by plain handlers and composed chains.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait).
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;

    /// Identifier used for qualified rule names when none is given explicitly.
    ///
    /// For an `fn` item this is its identifier (`login` for `auth::login`);
    /// a closure reports the function it was written in.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Always answers with the same response. Stands in for the rest of a chain
/// once a middleware has decided to respond.
pub(crate) struct Ready(pub(crate) Response);

impl ErasedHandler for Ready {
    fn call(&self, _req: Request) -> BoxFuture {
        let res = self.0.clone();
        Box::pin(async move { res })
    }
}

// ── Named handlers ────────────────────────────────────────────────────────────

/// A terminal handler together with the name it was declared under.
///
/// The name is captured once, at declaration time, and later becomes the
/// last segment of the mounted rule's qualified name.
#[derive(Clone)]
pub struct NamedHandler {
    name: Cow<'static, str>,
    handler: BoxedHandler,
}

impl NamedHandler {
    pub fn new(handler: impl Handler) -> Self {
        let name = handler.name();
        Self { name: Cow::Borrowed(name), handler: handler.into_boxed_handler() }
    }

    pub fn with_name(name: impl Into<Cow<'static, str>>, handler: impl Handler) -> Self {
        Self { name: name.into(), handler: handler.into_boxed_handler() }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn handler(&self) -> &BoxedHandler { &self.handler }
}

impl std::fmt::Debug for NamedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedHandler").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Last path segment of `T`'s type name, skipping closure markers and
/// generic arguments: `app::auth::login` → `login`,
/// `app::auth::routes::{{closure}}` → `routes`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    async fn get_user(_req: Request) -> &'static str {
        "user"
    }

    #[test]
    fn fn_items_report_their_identifier() {
        assert_eq!(get_user.name(), "get_user");
        assert_eq!(NamedHandler::new(get_user).name(), "get_user");
    }

    #[test]
    fn closures_report_the_enclosing_fn() {
        let h = |_req: Request| async { "anon" };
        assert_eq!(h.name(), "closures_report_the_enclosing_fn");
    }

    #[test]
    fn explicit_names_win() {
        assert_eq!(NamedHandler::with_name("profile", get_user).name(), "profile");
    }

    #[tokio::test]
    async fn boxed_handler_produces_response() {
        let h = get_user.into_boxed_handler();
        let res = h.call(Request::builder(Method::Get, "/")).await;
        assert_eq!(res.body(), b"user");
    }

    #[tokio::test]
    async fn ready_repeats_its_response() {
        let h = Ready(Response::text("cached"));
        for _ in 0..2 {
            let res = h.call(Request::builder(Method::Get, "/")).await;
            assert_eq!(res.body(), b"cached");
        }
    }
}
