//! Mock embedder for testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;

/// Default dimension of mock vectors
pub const MOCK_DIMENSION: usize = 64;

/// Mock embedder producing deterministic hash-based unit vectors.
///
/// Identical inputs always produce identical outputs, so dedup and ranking
/// can be tested without a model. Counts calls and embedded texts.
#[derive(Debug)]
pub struct MockEmbedder {
    dimension: usize,
    fail: bool,
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl MockEmbedder {
    /// Create a new mock embedder.
    pub fn new() -> Self {
        Self::with_dimension(MOCK_DIMENSION)
    }

    /// Create with a custom vector dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
            calls: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Number of `embed_texts` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of texts embedded so far.
    pub fn text_count(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    /// Deterministic vector for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut result: Vec<f32> = (0..self.dimension)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                i.hash(&mut hasher);
                let h = hasher.finish();
                (((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0) as f32
            })
            .collect();

        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }
        result
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::Api("mock provider unavailable".to_string()));
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbeddingError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_dimension() {
        let embedder = MockEmbedder::with_dimension(16);
        let vector = embedder.embed_text("hello world").await.unwrap();
        assert_eq!(vector.len(), 16);
    }

    #[tokio::test]
    async fn test_mock_deterministic() {
        let embedder = MockEmbedder::new();
        let v1 = embedder.embed_text("same text").await.unwrap();
        let v2 = embedder.embed_text("same text").await.unwrap();
        assert_eq!(v1, v2);

        let v3 = embedder.embed_text("other text").await.unwrap();
        assert_ne!(v1, v3);
    }

    #[tokio::test]
    async fn test_mock_unit_length() {
        let embedder = MockEmbedder::new();
        let vector = embedder.embed_text("norm").await.unwrap();
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mock_counts() {
        let embedder = MockEmbedder::new();
        embedder
            .embed_texts(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        embedder.embed_text("c").await.unwrap();

        assert_eq!(embedder.call_count(), 2);
        assert_eq!(embedder.text_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let embedder = MockEmbedder::failing();
        let err = embedder.embed_text("a").await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(embedder.text_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_empty_text() {
        let embedder = MockEmbedder::new();
        assert!(matches!(
            embedder.embed_text("").await,
            Err(EmbeddingError::InvalidInput(_))
        ));
    }
}
