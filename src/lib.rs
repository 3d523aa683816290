//! # mux
//!
//! Route groups with middleware chains, mounted onto a minimal hyper router
//! under a namespace prefix.
//!
//! - A [`Group`] collects routes. Each route is an endpoint, a method set and
//!   a handler chain: zero or more middlewares followed by one handler.
//! - Every chain is validated and compiled into one handler when it is
//!   declared. Malformed chains are rejected right there, never at request time.
//! - [`Mux::mount`] registers a group under a prefix: `/auth` + `/login`
//!   becomes `/auth/login`, named `auth.<handler>`.
//! - The resulting [`Router`] is served by [`Server`], or called in-process
//!   with [`Router::call`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mux::chain::{handler, middleware};
//! use mux::middleware::{from_fn, Next};
//! use mux::{Group, IntoResponse, Json, Mux, Request, Response, Router, Server, StatusCode};
//! use serde_json::json;
//!
//! async fn is_admin(req: Request, next: Next) -> Response {
//!     if req.header("admin").is_none() {
//!         let body = json!({ "success": false, "message": "only admins are allowed" });
//!         return (Json(body), StatusCode::FORBIDDEN).into_response();
//!     }
//!     next.run(req).await
//! }
//!
//! async fn dashboard(req: Request) -> Json<serde_json::Value> {
//!     Json(json!({ "success": true, "admin": req.header("admin") }))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mux::Error> {
//!     let mut admin = Group::new();
//!     admin.get("/dashboard", [middleware(from_fn(is_admin)), handler(dashboard)])?;
//!
//!     let mut mux = Mux::new(Router::new());
//!     mux.mount("/admin", &admin)?;
//!
//!     Server::bind("0.0.0.0:3000").serve(mux.into_router()).await
//! }
//! ```

mod error;
mod group;
mod handler;
mod method;
mod mount;
mod request;
mod response;
mod router;
mod server;

pub mod chain;
pub mod middleware;

pub use error::Error;
pub use group::{Group, Route};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, NamedHandler};
pub use http::StatusCode;
pub use method::Method;
pub use mount::{MountedRule, Mux, mount, mount_path, namespace, qualified_name};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::{Router, RuleSink};
pub use server::Server;
