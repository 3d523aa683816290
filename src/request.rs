//! Incoming HTTP request type.

use std::collections::HashMap;

use crate::method::Method;

/// An incoming HTTP request.
///
/// Owned by whoever is currently handling it: middlewares receive it by value
/// and hand it on to [`Next::run`](crate::middleware::Next::run).
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self { method, path, headers, body, params: HashMap::new() }
    }

    /// Builds a request for in-process dispatch through
    /// [`Router::call`](crate::Router::call), without a socket.
    ///
    /// ```rust
    /// use mux::{Method, Request};
    ///
    /// let req = Request::builder(Method::Post, "/auth/login")
    ///     .with_header("content-type", "application/json")
    ///     .with_body(br#"{"user":"alice"}"#.to_vec());
    /// assert_eq!(req.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn builder(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path.into(), Vec::new(), Vec::new())
    }

    /// Appends a header. Builder-style.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Replaces the body. Builder-style.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// `true` when the `content-type` header names a JSON media type.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::builder(Method::Get, "/").with_header("Authorization", "token");
        assert_eq!(req.header("authorization"), Some("token"));
        assert_eq!(req.header("admin"), None);
    }

    #[test]
    fn detects_json_content_type() {
        let json = Request::builder(Method::Post, "/")
            .with_header("content-type", "application/json; charset=utf-8");
        let vendor = Request::builder(Method::Post, "/")
            .with_header("content-type", "application/problem+json");
        let text = Request::builder(Method::Post, "/").with_header("content-type", "text/plain");

        assert!(json.is_json());
        assert!(vendor.is_json());
        assert!(!text.is_json());
        assert!(!Request::builder(Method::Post, "/").is_json());
    }
}
