//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while producing embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Request never got a response (connection, DNS, TLS)
    #[error("API request failed: {0}")]
    Api(String),

    /// Non-success HTTP status other than 401/403/429
    #[error("API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Provider rejected the credential (401/403)
    #[error("API rejected credentials (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// Response body could not be parsed
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// Provider answered 429
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Request timed out
    #[error("Timeout waiting for embedding response")]
    Timeout,

    /// Provider misconfigured
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider returned a different number of vectors than texts
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// Failure reported by a caller-supplied embedding function
    #[error("Embedding provider error: {0}")]
    Provider(String),
}

impl EmbeddingError {
    /// True for failures worth retrying: transport errors, 5xx, 429 and timeouts.
    pub fn is_transient(&self) -> bool {
        match self {
            EmbeddingError::Api(_)
            | EmbeddingError::RateLimitExceeded
            | EmbeddingError::Timeout => true,
            EmbeddingError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(EmbeddingError::Timeout.is_transient());
        assert!(EmbeddingError::RateLimitExceeded.is_transient());
        assert!(EmbeddingError::Api("connection reset".to_string()).is_transient());
        assert!(EmbeddingError::Http {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!EmbeddingError::Http {
            status: 400,
            body: "bad request".to_string()
        }
        .is_transient());
        assert!(!EmbeddingError::Unauthorized {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!EmbeddingError::Parse("bad json".to_string()).is_transient());
        assert!(!EmbeddingError::Config("no key".to_string()).is_transient());
        assert!(!EmbeddingError::CountMismatch { expected: 2, actual: 1 }.is_transient());
    }

    #[test]
    fn test_display() {
        let err = EmbeddingError::CountMismatch { expected: 3, actual: 1 };
        assert_eq!(err.to_string(), "Embedding count mismatch: expected 3, got 1");
    }
}
