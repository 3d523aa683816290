//! Middlewares and handlers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mux::middleware::{Middleware, Next, Step};
use mux::{IntoResponse, Json, Request, Response, StatusCode};
use serde_json::{Value, json};

fn deny(message: &str, status: StatusCode) -> Response {
    (Json(json!({ "success": false, "message": message })), status).into_response()
}

pub async fn is_auth(req: Request, next: Next) -> Response {
    if req.header("authorization").is_none() {
        return deny("unauthorized access", StatusCode::UNAUTHORIZED);
    }
    next.run(req).await
}

pub async fn is_admin(req: Request, next: Next) -> Response {
    if req.header("admin").is_none() {
        return deny("only admins are allowed", StatusCode::FORBIDDEN);
    }
    next.run(req).await
}

pub async fn is_json(req: Request, next: Next) -> Response {
    if !req.is_json() || req.json::<Value>().is_err() {
        return deny("request body must be valid json", StatusCode::BAD_REQUEST);
    }
    next.run(req).await
}

/// Passes everything through and counts how often it saw a request.
#[derive(Clone, Default)]
pub struct Counter(pub Arc<AtomicUsize>);

impl Counter {
    pub fn hits(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Middleware for Counter {
    fn wrap(&self, next: Next) -> Step {
        let hits = Arc::clone(&self.0);
        Step::proceed(move |req: Request| {
            hits.fetch_add(1, Ordering::SeqCst);
            next.clone().run(req)
        })
    }
}
