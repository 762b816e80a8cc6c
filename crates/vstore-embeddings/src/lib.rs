//! # vstore-embeddings
//!
//! Embedding providers for vector-storage.
//!
//! The index asks a provider for one vector per text, in batches. Two
//! variants are selected at construction time:
//! - [`ApiEmbedder`]: OpenAI-compatible `/embeddings` endpoint with bearer
//!   auth, timeout and exponential-backoff retries
//! - [`FnEmbedder`]: a caller-supplied embedding function
//!
//! [`MockEmbedder`] produces deterministic vectors for tests.

pub mod api;
pub mod error;
pub mod function;
pub mod mock;
pub mod provider;

pub use api::{ApiEmbedder, ApiEmbedderConfig};
pub use error::EmbeddingError;
pub use function::FnEmbedder;
pub use mock::{MockEmbedder, MOCK_DIMENSION};
pub use provider::{ensure_count, EmbeddingProvider};
