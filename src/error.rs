//! Unified error type.

use thiserror::Error;

/// The error type returned by mux's fallible operations.
///
/// Application-level failures (401, 403, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// malformed route declarations, routing-table conflicts and infrastructure
/// failures such as binding to a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A route was declared with an empty handler chain.
    #[error("route `{endpoint}` has no handler")]
    MissingHandler { endpoint: String },

    /// A chain element cannot be invoked in the role its position requires:
    /// a handler before the end of the chain, or a middleware at the end.
    #[error("route `{endpoint}`: chain element {position} is not invocable in its position")]
    UncallableMiddleware { endpoint: String, position: usize },

    /// The router refused a path (bad syntax or a conflicting registration).
    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },
}
