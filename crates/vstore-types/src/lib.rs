//! # vstore-types
//!
//! Shared domain types for vector-storage.
//!
//! - Documents: text + metadata + embedding records held by the index
//! - Filters: include/exclude criteria applied before scoring
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use vstore_types::Document;
//!
//! let doc = Document::with_embedding("hello", (), vec![3.0, 4.0], 0);
//! assert_eq!(doc.vector_mag, Some(5.0));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod filter;

pub use config::{
    EmbeddingSettings, Settings, DEFAULT_API_BASE_URL, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_MAX_SIZE_IN_MB,
};
pub use document::{magnitude, Document, SimilarityResult};
pub use error::TypesError;
pub use filter::{FilterCriteria, FilterOptions, TextFilter};
