//! # vstore-index
//!
//! Embedded vector index: a bounded collection of (text, embedding, metadata)
//! records answering nearest-neighbor queries by cosine similarity.
//!
//! ## Features
//! - Text-unique documents; duplicate inserts are dropped and counted
//! - Stable cosine ranking with include/exclude filters on metadata and text
//! - Size budget enforced after every mutation by evicting the documents
//!   with the fewest hits, oldest first
//! - Replace-all snapshot after every mutation, best effort
//!
//! ## Components
//! - [`filter`]: include/exclude predicates
//! - [`similarity`]: magnitude, cosine, normalized score
//! - [`eviction`]: least-valuable-first eviction under a size budget
//! - [`store`]: the authoritative collection
//! - [`facade`]: builder and public entry point

pub mod error;
pub mod eviction;
pub mod facade;
pub mod filter;
pub mod similarity;
pub mod size;
pub mod store;

pub use error::{ErrorKind, IndexError};
pub use eviction::EvictionPolicy;
pub use facade::{VectorStorage, VectorStorageBuilder};
pub use size::{JsonSizeEstimator, SizeEstimator};
pub use store::{
    DocumentStore, InsertOutcome, QueryEmbedding, QueryOutcome, QueryParams, SnapshotStatus,
    StoreStats, DEFAULT_K,
};

pub use vstore_types::{Document, FilterCriteria, FilterOptions, SimilarityResult, TextFilter};
