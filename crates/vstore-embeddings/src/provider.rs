//! Embedding provider trait.
//!
//! The index only needs a batch function from texts to vectors. Two
//! implementations ship with the crate: [`crate::ApiEmbedder`] for
//! OpenAI-compatible endpoints and [`crate::FnEmbedder`] wrapping a
//! caller-supplied function.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Pluggable embedding provider.
///
/// Implementations must return one vector per input text, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Embed a batch of texts.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vectors = self.embed_texts(&[text.to_string()]).await?;
        let vectors = ensure_count(1, vectors)?;
        vectors
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0,
            })
    }
}

/// Check that a provider answered with exactly `expected` vectors.
pub fn ensure_count(
    expected: usize,
    vectors: Vec<Vec<f32>>,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoLength;

    #[async_trait]
    impl EmbeddingProvider for EchoLength {
        fn name(&self) -> &str {
            "echo-length"
        }

        async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    struct Silent;

    #[async_trait]
    impl EmbeddingProvider for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        async fn embed_texts(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_embed_text_default() {
        let vector = EchoLength.embed_text("abc").await.unwrap();
        assert_eq!(vector, vec![3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_embed_text_empty_answer() {
        let result = Silent.embed_text("abc").await;
        assert!(matches!(
            result,
            Err(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_ensure_count() {
        assert!(ensure_count(2, vec![vec![1.0], vec![2.0]]).is_ok());
        assert!(ensure_count(2, vec![vec![1.0]]).is_err());
    }
}
