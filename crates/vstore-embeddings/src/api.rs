//! API-based embedder using OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use vstore_types::{EmbeddingSettings, DEFAULT_API_BASE_URL};

use crate::error::EmbeddingError;
use crate::provider::{ensure_count, EmbeddingProvider};

/// Configuration for the API embedder.
#[derive(Debug, Clone)]
pub struct ApiEmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "text-embedding-ada-002")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Attempts per request, including the first one
    pub max_retries: u32,

    /// Upper bound on the total time spent retrying
    pub max_elapsed: Duration,
}

impl ApiEmbedderConfig {
    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            max_elapsed: Duration::from_secs(120),
        }
    }

    /// Build from settings, using `api_key` as the credential.
    pub fn from_settings(settings: &EmbeddingSettings, api_key: SecretString) -> Self {
        Self {
            base_url: settings.base_url().to_string(),
            model: settings.model.clone(),
            api_key,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries.max(1),
            max_elapsed: Duration::from_secs(120),
        }
    }

    /// Override the base URL (builder pattern).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry budget (builder pattern).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Override the request timeout (builder pattern).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Embedder calling an OpenAI-compatible embeddings endpoint.
pub struct ApiEmbedder {
    client: Client,
    config: ApiEmbedderConfig,
}

impl ApiEmbedder {
    /// Create a new API embedder.
    pub fn new(config: ApiEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(EmbeddingError::Config("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Model name sent with each request.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Call the API with retry logic.
    async fn call_api(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.config.max_elapsed),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, count = texts.len(), "Calling embeddings API");

            match self.make_request(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => {
                    if !e.is_transient() || attempts >= self.config.max_retries {
                        error!(error = %e, attempts, "Embedding request failed");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Embedding request failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Make a single API request.
    async fn make_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbeddingRequest {
            input: texts,
            model: &self.config.model,
        };

        let url = format!("{}/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else {
                    EmbeddingError::Api(e.to_string())
                }
            })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbeddingError::RateLimitExceeded);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let status = status.as_u16();
            return Err(match status {
                401 | 403 => EmbeddingError::Unauthorized { status, body },
                _ => EmbeddingError::Http { status, body },
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        Ok(order_by_index(body.data))
    }
}

/// Restore input order; entries without an index keep their position.
fn order_by_index(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
    }
    data.into_iter().map(|d| d.embedding).collect()
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    fn name(&self) -> &str {
        "api"
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.call_api(texts).await?;
        ensure_count(texts.len(), vectors)
    }
}
