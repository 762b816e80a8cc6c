//! Embedder backed by a caller-supplied function.

use std::future::Future;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};

use crate::error::EmbeddingError;
use crate::provider::{ensure_count, EmbeddingProvider};

type EmbedFn =
    dyn Fn(Vec<String>) -> BoxFuture<'static, Result<Vec<Vec<f32>>, EmbeddingError>> + Send + Sync;

/// Wraps an async closure `Vec<String> -> Vec<Vec<f32>>` as a provider.
///
/// Used when the caller replaces the default API provider entirely.
pub struct FnEmbedder {
    func: Box<EmbedFn>,
}

impl FnEmbedder {
    /// Wrap an async embedding function.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'static,
    {
        Self {
            func: Box::new(move |texts| func(texts).boxed()),
        }
    }

    /// Wrap a synchronous embedding function.
    pub fn from_sync<F>(func: F) -> Self
    where
        F: Fn(&[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> + Send + Sync + 'static,
    {
        Self::new(move |texts: Vec<String>| future::ready(func(&texts)))
    }
}

impl std::fmt::Debug for FnEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEmbedder").finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingProvider for FnEmbedder {
    fn name(&self) -> &str {
        "custom"
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = (self.func)(texts.to_vec()).await?;
        ensure_count(texts.len(), vectors)
    }
}
