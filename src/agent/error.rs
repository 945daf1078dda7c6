//! Error types for agent operations.

use thiserror::Error;

/// Errors that can occur while talking to a generation or embedding backend.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Backend returned an error response (4xx, 5xx).
    #[error("Backend error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Backend response doesn't match expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Agent configuration error (missing API key, bad URL).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Map a reqwest send error, distinguishing timeouts from other network failures.
    pub(crate) fn from_send(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            AgentError::Timeout(timeout_ms)
        } else {
            AgentError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_upstream_status() {
        let err = AgentError::Upstream {
            status: 503,
            message: "model loading".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error 503: model loading");
    }

    #[test]
    fn display_timeout_in_millis() {
        assert_eq!(
            AgentError::Timeout(120000).to_string(),
            "Request timeout after 120000ms"
        );
    }
}
