//! Error types for routing failures

use crate::agent::AgentError;
use thiserror::Error;

/// Errors surfaced by [`Router::route`](super::Router::route).
///
/// A failed verification is not an error: it is carried in the verdict of
/// the returned response.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A hard query needs the remote backend but none is configured
    #[error("Query difficulty {difficulty:.3} requires a remote backend, but none is configured")]
    RemoteUnavailable { difficulty: f64 },

    /// A backend call failed; never retried by the router
    #[error(transparent)]
    Backend(#[from] AgentError),
}
