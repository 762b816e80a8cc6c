//! Public entry point wiring configuration to a [`DocumentStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use vstore_embeddings::{
    ApiEmbedder, ApiEmbedderConfig, EmbeddingError, EmbeddingProvider, FnEmbedder,
};
use vstore_storage::{MemorySnapshotStore, SnapshotStore};
use vstore_types::{Document, EmbeddingSettings, Settings, DEFAULT_MAX_SIZE_IN_MB};

use crate::error::IndexError;
use crate::eviction::EvictionPolicy;
use crate::size::{JsonSizeEstimator, SizeEstimator};
use crate::store::{
    DocumentStore, InsertOutcome, QueryOutcome, QueryParams, SnapshotStatus, StoreStats,
};

/// Builder for [`VectorStorage`].
///
/// An embedding path is required: either a caller-supplied function or
/// provider, or an API key for the default OpenAI-compatible provider.
pub struct VectorStorageBuilder<T> {
    max_size_in_mb: f64,
    embedding: EmbeddingSettings,
    api_key: Option<SecretString>,
    request_timeout: Option<Duration>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    snapshots: Option<Box<dyn SnapshotStore<Document<T>>>>,
    estimator: Option<Box<dyn SizeEstimator<T>>>,
}

impl<T> Default for VectorStorageBuilder<T> {
    fn default() -> Self {
        Self {
            max_size_in_mb: DEFAULT_MAX_SIZE_IN_MB,
            embedding: EmbeddingSettings::default(),
            api_key: None,
            request_timeout: None,
            provider: None,
            snapshots: None,
            estimator: None,
        }
    }
}

impl<T> VectorStorageBuilder<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Budget and embedding options from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_size_in_mb: settings.max_size_in_mb,
            embedding: settings.embedding.clone(),
            api_key: settings
                .embedding
                .api_key
                .clone()
                .map(SecretString::from),
            ..Self::default()
        }
    }

    pub fn max_size_in_mb(mut self, max_size_in_mb: f64) -> Self {
        self.max_size_in_mb = max_size_in_mb;
        self
    }

    /// Model name passed to the default provider.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding.model = model.into();
        self
    }

    /// Credential for the default provider.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.embedding.api_base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout of the default provider. Overrides
    /// `embedding.timeout_secs` at full precision.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.embedding.max_retries = max_retries;
        self
    }

    /// Replace the default provider with an async embedding function.
    pub fn embed_texts_fn<F, Fut>(self, func: F) -> Self
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'static,
    {
        self.embedding_provider(Arc::new(FnEmbedder::new(func)))
    }

    /// Replace the default provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Persistence backend. Defaults to a volatile in-memory backend.
    pub fn snapshot_store(mut self, store: impl SnapshotStore<Document<T>> + 'static) -> Self {
        self.snapshots = Some(Box::new(store));
        self
    }

    /// Size estimator. Defaults to [`JsonSizeEstimator`].
    pub fn size_estimator(mut self, estimator: impl SizeEstimator<T> + 'static) -> Self {
        self.estimator = Some(Box::new(estimator));
        self
    }

    /// Validate the configuration and open the store.
    pub fn build(self) -> Result<VectorStorage<T>, IndexError>
    where
        T: DeserializeOwned,
    {
        if !self.max_size_in_mb.is_finite() || self.max_size_in_mb <= 0.0 {
            return Err(IndexError::Configuration(format!(
                "max_size_in_mb must be positive, got {}",
                self.max_size_in_mb
            )));
        }

        let provider: Arc<dyn EmbeddingProvider> = match (self.provider, self.api_key) {
            (Some(provider), _) => provider,
            (None, Some(api_key)) => {
                let config = api_config(&self.embedding, self.request_timeout, api_key);
                Arc::new(ApiEmbedder::new(config)?)
            }
            (None, None) => {
                return Err(IndexError::Configuration(
                    "an embedding function or an API key is required".to_string(),
                ))
            }
        };

        let eviction = match self.estimator {
            Some(estimator) => {
                EvictionPolicy::with_boxed_estimator(self.max_size_in_mb, estimator)
            }
            None => EvictionPolicy::with_estimator(self.max_size_in_mb, JsonSizeEstimator),
        };
        let snapshots = self
            .snapshots
            .unwrap_or_else(|| Box::new(MemorySnapshotStore::<Document<T>>::new()));

        info!(
            budget_mb = self.max_size_in_mb,
            embedder = provider.name(),
            "Building vector storage"
        );
        Ok(VectorStorage {
            store: DocumentStore::open(provider, snapshots, eviction),
        })
    }
}

fn api_config(
    settings: &EmbeddingSettings,
    request_timeout: Option<Duration>,
    api_key: SecretString,
) -> ApiEmbedderConfig {
    let config = ApiEmbedderConfig::from_settings(settings, api_key);
    match request_timeout {
        Some(timeout) => config.with_timeout(timeout),
        None => config,
    }
}

/// Embedded vector index.
///
/// ```no_run
/// # async fn demo() -> Result<(), vstore_index::IndexError> {
/// use vstore_index::{QueryParams, VectorStorage};
///
/// let mut storage = VectorStorage::<serde_json::Value>::builder()
///     .api_key("sk-...")
///     .build()?;
/// storage
///     .add_texts(vec!["hello".into()], vec![serde_json::json!({})])
///     .await?;
/// let outcome = storage.similarity_search(QueryParams::new("hi")).await?;
/// # Ok(())
/// # }
/// ```
pub struct VectorStorage<T> {
    store: DocumentStore<T>,
}

impl<T> VectorStorage<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    pub fn builder() -> VectorStorageBuilder<T> {
        VectorStorageBuilder::new()
    }

    /// Insert documents; see [`DocumentStore::insert`].
    pub async fn add_texts(
        &mut self,
        texts: Vec<String>,
        metadatas: Vec<T>,
    ) -> Result<InsertOutcome<T>, IndexError> {
        self.store.insert(texts, metadatas).await
    }

    /// Insert one document. Returns `None` if its text was already present.
    pub async fn add_text(
        &mut self,
        text: impl Into<String>,
        metadata: T,
    ) -> Result<Option<Document<T>>, IndexError> {
        let outcome = self.store.insert(vec![text.into()], vec![metadata]).await?;
        Ok(outcome.added.into_iter().next())
    }

    /// Rank resident documents; see [`DocumentStore::query`].
    pub async fn similarity_search(
        &mut self,
        params: QueryParams,
    ) -> Result<QueryOutcome<T>, IndexError> {
        self.store.query(params).await
    }

    pub fn reload(&mut self) -> Result<usize, IndexError> {
        self.store.reload()
    }

    pub fn persist(&self) -> SnapshotStatus {
        self.store.persist()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn documents(&self) -> &[Document<T>] {
        self.store.documents()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
