//! Minimal mux example — an auth group behind middleware, mounted at `/auth`.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl -X POST http://localhost:3000/auth/login \
//!        -H 'content-type: application/json' -d '{"user":"alice"}'
//!   curl http://localhost:3000/auth/admin                       # 401
//!   curl http://localhost:3000/auth/admin -H 'authorization: t' # 403
//!   curl http://localhost:3000/auth/admin -H 'authorization: t' -H 'admin: alice'

use mux::chain::{handler, middleware};
use mux::middleware::{Next, from_fn};
use mux::{Group, IntoResponse, Json, Mux, Request, Response, Router, Server, StatusCode};
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), mux::Error> {
    tracing_subscriber::fmt::init();

    let mut root = Group::new();
    root.get("/", [handler(index)])?;

    let mut auth = Group::new();
    auth.post("/login", [middleware(from_fn(is_json)), handler(login)])?
        .get("/admin", [
            middleware(from_fn(is_auth)),
            middleware(from_fn(is_admin)),
            handler(admin),
        ])?;

    let mut mux = Mux::new(Router::new());
    mux.mount("/", &root)?;
    mux.mount("/auth", &auth)?;

    Server::bind("0.0.0.0:3000").serve(mux.into_router()).await
}

fn deny(message: &str, status: StatusCode) -> Response {
    (Json(json!({ "success": false, "message": message })), status).into_response()
}

async fn is_json(req: Request, next: Next) -> Response {
    if !req.is_json() {
        return deny("request body must be valid json", StatusCode::BAD_REQUEST);
    }
    next.run(req).await
}

async fn is_auth(req: Request, next: Next) -> Response {
    if req.header("authorization").is_none() {
        return deny("unauthorized access", StatusCode::UNAUTHORIZED);
    }
    next.run(req).await
}

async fn is_admin(req: Request, next: Next) -> Response {
    if req.header("admin").is_none() {
        return deny("only admins are allowed", StatusCode::FORBIDDEN);
    }
    next.run(req).await
}

// GET /
async fn index(_req: Request) -> Json<Value> {
    Json(json!({ "success": true }))
}

// POST /auth/login
async fn login(req: Request) -> Response {
    match req.json::<Value>() {
        Ok(body) => Json(json!({ "success": true, "req_body": body })).into_response(),
        Err(_) => deny("request body must be valid json", StatusCode::BAD_REQUEST),
    }
}

// GET /auth/admin
async fn admin(req: Request) -> Json<Value> {
    Json(json!({ "success": true, "admin": req.header("admin") }))
}
