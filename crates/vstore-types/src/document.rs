//! Stored documents and similarity results.
//!
//! A [`Document`] is the unit held by the index: the text (unique key), the
//! caller's metadata, the embedding and its precomputed magnitude, plus the
//! bookkeeping used by eviction (`timestamp`, `hits`).

use serde::{Deserialize, Serialize};

/// Euclidean norm of a vector.
pub fn magnitude(values: &[f32]) -> f32 {
    values.iter().map(|v| v * v).sum::<f32>().sqrt()
}

/// A stored document.
///
/// `vector` and `vector_mag` are either both set or both absent. The
/// magnitude is computed once when the embedding is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<T> {
    /// Document text, unique within a store
    pub text: String,

    /// Caller-defined metadata
    pub metadata: T,

    /// Embedding vector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,

    /// Precomputed Euclidean norm of `vector`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_mag: Option<f32>,

    /// Creation time (ms since epoch)
    pub timestamp: i64,

    /// Number of query result sets this document appeared in
    #[serde(default)]
    pub hits: u64,
}

impl<T> Document<T> {
    /// Create a document without an embedding.
    pub fn new(text: impl Into<String>, metadata: T, timestamp: i64) -> Self {
        Self {
            text: text.into(),
            metadata,
            vector: None,
            vector_mag: None,
            timestamp,
            hits: 0,
        }
    }

    /// Create a document with an embedding, computing its magnitude.
    pub fn with_embedding(
        text: impl Into<String>,
        metadata: T,
        vector: Vec<f32>,
        timestamp: i64,
    ) -> Self {
        let vector_mag = magnitude(&vector);
        Self {
            text: text.into(),
            metadata,
            vector: Some(vector),
            vector_mag: Some(vector_mag),
            timestamp,
            hits: 0,
        }
    }

    /// Set the hit counter (builder pattern).
    pub fn with_hits(mut self, hits: u64) -> Self {
        self.hits = hits;
        self
    }

    /// True if both the vector and its magnitude are present.
    pub fn has_embedding(&self) -> bool {
        self.vector.is_some() && self.vector_mag.is_some()
    }

    /// Drop the vector and magnitude.
    pub fn strip_embedding(&mut self) {
        self.vector = None;
        self.vector_mag = None;
    }

    /// Vector dimension, if embedded.
    pub fn dimension(&self) -> Option<usize> {
        self.vector.as_ref().map(Vec::len)
    }
}

/// A document returned from a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult<T> {
    /// The matched document (a copy of the resident record)
    #[serde(flatten)]
    pub document: Document<T>,

    /// Normalized cosine similarity in [0, 1]; 1 means same direction
    pub score: f32,
}

impl<T> SimilarityResult<T> {
    pub fn new(document: Document<T>, score: f32) -> Self {
        Self { document, score }
    }

    /// Text of the matched document.
    pub fn text(&self) -> &str {
        &self.document.text
    }
}
