//! Index error types.

use thiserror::Error;

use vstore_embeddings::EmbeddingError;
use vstore_storage::StorageError;

/// Who has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request; fix the input
    Caller,
    /// Embedding provider failed
    Provider,
    /// Persistence backend failed; in-memory state is still authoritative
    Persistence,
    /// Store cannot embed at all
    Configuration,
}

/// Errors that can occur during index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Batch insert with unequal text and metadata counts
    #[error("Arity mismatch: {texts} texts but {metadatas} metadata entries")]
    ArityMismatch { texts: usize, metadatas: usize },

    /// Embedding provider failed
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Persistence backend failed
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),

    /// No usable embedding path, or an invalid budget
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Vector lengths disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::ArityMismatch { .. }
            | IndexError::InvalidInput(_)
            | IndexError::DimensionMismatch { .. } => ErrorKind::Caller,
            IndexError::Embedding(EmbeddingError::Config(_))
            | IndexError::Embedding(EmbeddingError::Unauthorized { .. }) => {
                ErrorKind::Configuration
            }
            IndexError::Embedding(_) => ErrorKind::Provider,
            IndexError::Persistence(_) => ErrorKind::Persistence,
            IndexError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// True if retrying the same call may succeed.
    ///
    /// Only transient provider failures qualify. Failures from a
    /// caller-supplied embedding function are opaque and count as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            IndexError::Embedding(EmbeddingError::Provider(_)) => true,
            IndexError::Embedding(err) => err.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let arity = IndexError::ArityMismatch {
            texts: 2,
            metadatas: 1,
        };
        assert_eq!(arity.kind(), ErrorKind::Caller);
        assert!(!arity.is_retryable());

        let provider = IndexError::from(EmbeddingError::Timeout);
        assert_eq!(provider.kind(), ErrorKind::Provider);
        assert!(provider.is_retryable());

        let misconfigured = IndexError::from(EmbeddingError::Config("no key".to_string()));
        assert_eq!(misconfigured.kind(), ErrorKind::Configuration);
        assert!(!misconfigured.is_retryable());

        let storage = IndexError::from(StorageError::Unavailable("gone".to_string()));
        assert_eq!(storage.kind(), ErrorKind::Persistence);
        assert!(!storage.is_retryable());
    }

    #[test]
    fn test_permanent_provider_failures_are_not_retryable() {
        let permanent = [
            EmbeddingError::Parse("bad json".to_string()),
            EmbeddingError::InvalidInput("empty".to_string()),
            EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1,
            },
            EmbeddingError::Http {
                status: 400,
                body: String::new(),
            },
        ];
        for err in permanent {
            let err = IndexError::from(err);
            assert_eq!(err.kind(), ErrorKind::Provider);
            assert!(!err.is_retryable(), "{err} should not be retryable");
        }

        let server_error = IndexError::from(EmbeddingError::Http {
            status: 502,
            body: String::new(),
        });
        assert!(server_error.is_retryable());

        let function_error = IndexError::from(EmbeddingError::Provider("flaky".to_string()));
        assert!(function_error.is_retryable());
    }

    #[test]
    fn test_rejected_credentials_are_configuration_errors() {
        let err = IndexError::from(EmbeddingError::Unauthorized {
            status: 401,
            body: "invalid key".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = IndexError::ArityMismatch {
            texts: 3,
            metadatas: 2,
        };
        assert_eq!(
            err.to_string(),
            "Arity mismatch: 3 texts but 2 metadata entries"
        );
    }
}
