//! The authoritative in-memory document collection.
//!
//! [`DocumentStore`] is the single point of mutation: it deduplicates and
//! embeds inserts, ranks queries, bumps hit counters, runs eviction and
//! writes a replace-all snapshot after every mutation. Snapshot failures are
//! logged and reported in the outcome; they never roll back memory.
//!
//! The store takes `&mut self` for every mutating call and does no locking.
//! Hosts sharing one store between tasks must serialize access themselves.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use vstore_embeddings::{ensure_count, EmbeddingProvider};
use vstore_storage::SnapshotStore;
use vstore_types::{magnitude, Document, FilterOptions, SimilarityResult};

use crate::error::IndexError;
use crate::eviction::EvictionPolicy;
use crate::filter;
use crate::similarity::{check_dimension, score};

/// Default number of query results
pub const DEFAULT_K: usize = 4;

/// Result of the snapshot attempted after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// Snapshot written
    Saved,
    /// Nothing changed, no snapshot attempted
    Skipped,
    /// Write failed; memory stays authoritative until the next snapshot
    Failed(String),
}

impl SnapshotStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SnapshotStatus::Failed(_))
    }
}

/// Outcome of an insert.
#[derive(Debug, Clone)]
pub struct InsertOutcome<T> {
    /// Newly added documents, in input order
    pub added: Vec<Document<T>>,
    /// Inputs dropped because their text was already present
    pub skipped: usize,
    /// Texts evicted to get back under budget
    pub evicted: Vec<String>,
    pub snapshot: SnapshotStatus,
}

/// Parameters of a similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub text: String,
    /// Maximum number of results
    pub k: usize,
    pub filter: FilterOptions,
    /// Keep `vector`/`vector_mag` on returned copies
    pub include_vectors: bool,
}

impl QueryParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            k: DEFAULT_K,
            filter: FilterOptions::default(),
            include_vectors: false,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_filter(mut self, filter: FilterOptions) -> Self {
        self.filter = filter;
        self
    }

    pub fn include_vectors(mut self, include: bool) -> Self {
        self.include_vectors = include;
        self
    }
}

/// The query text and the embedding it was ranked against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEmbedding {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Outcome of a query.
#[derive(Debug, Clone)]
pub struct QueryOutcome<T> {
    /// Ranked results, best first, carrying post-increment hit counts
    pub results: Vec<SimilarityResult<T>>,
    pub query: QueryEmbedding,
    /// Texts evicted after the hit update
    pub evicted: Vec<String>,
    pub snapshot: SnapshotStatus,
}

/// Store statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of resident documents
    pub document_count: usize,
    /// Embedding dimension, if any document is embedded
    pub dimension: Option<usize>,
    /// Estimated size of the collection (MB)
    pub estimated_size_mb: f64,
    /// Eviction budget (MB)
    pub max_size_in_mb: f64,
    /// Sum of hit counters
    pub total_hits: u64,
}

/// Size-bounded document collection with cosine ranking.
pub struct DocumentStore<T> {
    documents: Vec<Document<T>>,
    embedder: Arc<dyn EmbeddingProvider>,
    snapshots: Box<dyn SnapshotStore<Document<T>>>,
    eviction: EvictionPolicy<T>,
}

impl<T> DocumentStore<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    /// Hydrate from `snapshots` and enforce the budget.
    ///
    /// A failing backend is logged and the store starts empty. Eviction on
    /// open happens in memory only; the next mutation writes the snapshot.
    pub fn open(
        embedder: Arc<dyn EmbeddingProvider>,
        snapshots: Box<dyn SnapshotStore<Document<T>>>,
        eviction: EvictionPolicy<T>,
    ) -> Self {
        let documents = match snapshots.load_all() {
            Ok(records) => hydrate(records),
            Err(e) => {
                warn!(
                    backend = snapshots.name(),
                    error = %e,
                    "Failed to load snapshot, starting empty"
                );
                Vec::new()
            }
        };

        let mut store = Self {
            documents,
            embedder,
            snapshots,
            eviction,
        };
        let evicted = store.evict();

        info!(
            documents = store.documents.len(),
            evicted = evicted.len(),
            embedder = store.embedder.name(),
            backend = store.snapshots.name(),
            "Opened document store"
        );
        store
    }

    /// Insert documents whose text is not already present.
    ///
    /// Duplicates (against the store and earlier inputs of the same call) are
    /// dropped silently and counted in `skipped`. All new texts are embedded
    /// in one provider call; if it fails nothing is added.
    pub async fn insert(
        &mut self,
        texts: Vec<String>,
        metadatas: Vec<T>,
    ) -> Result<InsertOutcome<T>, IndexError> {
        if texts.len() != metadatas.len() {
            return Err(IndexError::ArityMismatch {
                texts: texts.len(),
                metadatas: metadatas.len(),
            });
        }

        let requested = texts.len();
        let keep: Vec<bool> = {
            let mut seen: HashSet<&str> = self.documents.iter().map(|d| d.text.as_str()).collect();
            texts.iter().map(|t| seen.insert(t.as_str())).collect()
        };
        let (fresh_texts, fresh_metadata): (Vec<String>, Vec<T>) = texts
            .into_iter()
            .zip(metadatas)
            .zip(keep)
            .filter_map(|(pair, keep)| keep.then_some(pair))
            .unzip();
        let skipped = requested - fresh_texts.len();

        if fresh_texts.is_empty() {
            debug!(requested, skipped, "Nothing new to insert");
            return Ok(InsertOutcome {
                added: Vec::new(),
                skipped,
                evicted: Vec::new(),
                snapshot: SnapshotStatus::Skipped,
            });
        }

        let vectors = self.embedder.embed_texts(&fresh_texts).await?;
        let vectors = ensure_count(fresh_texts.len(), vectors)?;

        if let Some(expected) = self.dimension().or_else(|| vectors.first().map(Vec::len)) {
            for vector in &vectors {
                check_dimension(expected, vector.len())?;
            }
        }

        let timestamp = Utc::now().timestamp_millis();
        let added: Vec<Document<T>> = fresh_texts
            .into_iter()
            .zip(fresh_metadata)
            .zip(vectors)
            .map(|((text, metadata), vector)| {
                Document::with_embedding(text, metadata, vector, timestamp)
            })
            .collect();
        self.documents.extend(added.iter().cloned());

        let evicted = self.evict();
        let snapshot = self.snapshot();

        info!(
            added = added.len(),
            skipped,
            evicted = evicted.len(),
            total = self.documents.len(),
            "Inserted documents"
        );
        Ok(InsertOutcome {
            added,
            skipped,
            evicted,
            snapshot,
        })
    }

    /// Rank resident documents against `params.text`.
    ///
    /// Every returned document has its resident hit counter incremented; if
    /// anything was returned, eviction runs and a snapshot is written.
    pub async fn query(&mut self, params: QueryParams) -> Result<QueryOutcome<T>, IndexError> {
        let QueryParams {
            text,
            k,
            filter: options,
            include_vectors,
        } = params;

        if text.is_empty() {
            return Err(IndexError::InvalidInput(
                "query text must not be empty".to_string(),
            ));
        }

        let embedding = self.embedder.embed_text(&text).await?;
        let query_mag = magnitude(&embedding);

        let mut scored: Vec<(usize, f32)> = Vec::new();
        for position in filter::filter_positions(&self.documents, &options) {
            let doc = &self.documents[position];
            let (Some(vector), Some(vector_mag)) = (doc.vector.as_deref(), doc.vector_mag) else {
                continue;
            };
            check_dimension(embedding.len(), vector.len())?;
            scored.push((position, score(&embedding, query_mag, vector, vector_mag)));
        }
        let candidates = scored.len();

        // Stable: equal scores keep collection order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        let mut results = Vec::with_capacity(scored.len());
        for (position, score) in scored {
            let doc = &mut self.documents[position];
            doc.hits += 1;
            let mut copy = doc.clone();
            if !include_vectors {
                copy.strip_embedding();
            }
            results.push(SimilarityResult::new(copy, score));
        }

        let (evicted, snapshot) = if results.is_empty() {
            (Vec::new(), SnapshotStatus::Skipped)
        } else {
            let evicted = self.evict();
            (evicted, self.snapshot())
        };

        debug!(
            k,
            candidates,
            returned = results.len(),
            evicted = evicted.len(),
            "Query complete"
        );
        Ok(QueryOutcome {
            results,
            query: QueryEmbedding { text, embedding },
            evicted,
            snapshot,
        })
    }

    /// Replace the resident collection with the backend's snapshot.
    ///
    /// Unlike [`DocumentStore::open`], a load failure is returned and the
    /// current collection is kept.
    pub fn reload(&mut self) -> Result<usize, IndexError> {
        let records = self.snapshots.load_all()?;
        self.documents = hydrate(records);
        let evicted = self.evict();

        info!(
            documents = self.documents.len(),
            evicted = evicted.len(),
            "Reloaded document store"
        );
        Ok(self.documents.len())
    }

    /// Write a snapshot of the current collection.
    pub fn persist(&self) -> SnapshotStatus {
        self.snapshot()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            document_count: self.documents.len(),
            dimension: self.dimension(),
            estimated_size_mb: self.eviction.estimate_mb(&self.documents),
            max_size_in_mb: self.eviction.max_size_in_mb(),
            total_hits: self.documents.iter().map(|d| d.hits).sum(),
        }
    }

    /// Resident documents, in collection order.
    pub fn documents(&self) -> &[Document<T>] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Name of the embedding provider
    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Embedding dimension of the resident collection
    pub fn dimension(&self) -> Option<usize> {
        self.documents.iter().find_map(|d| d.dimension())
    }

    fn evict(&mut self) -> Vec<String> {
        self.eviction
            .enforce(&mut self.documents)
            .into_iter()
            .map(|doc| doc.text)
            .collect()
    }

    fn snapshot(&self) -> SnapshotStatus {
        match self.snapshots.replace_all(&self.documents) {
            Ok(()) => {
                debug!(
                    backend = self.snapshots.name(),
                    documents = self.documents.len(),
                    "Snapshot written"
                );
                SnapshotStatus::Saved
            }
            Err(e) => {
                warn!(
                    backend = self.snapshots.name(),
                    error = %e,
                    "Snapshot failed, keeping in-memory state"
                );
                SnapshotStatus::Failed(e.to_string())
            }
        }
    }
}

/// Drop repeated texts and restore vector/magnitude pairing on loaded records.
fn hydrate<T>(records: Vec<Document<T>>) -> Vec<Document<T>> {
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(records.len());

    for mut doc in records {
        if !seen.insert(doc.text.clone()) {
            warn!(text_len = doc.text.len(), "Dropping duplicate record from snapshot");
            continue;
        }
        match (&doc.vector, doc.vector_mag) {
            (Some(vector), None) => doc.vector_mag = Some(magnitude(vector)),
            (None, Some(_)) => doc.vector_mag = None,
            _ => {}
        }
        documents.push(doc);
    }
    documents
}
