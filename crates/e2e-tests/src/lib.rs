//! End-to-end test infrastructure for vector-storage.
//!
//! Provides a shared TestHarness backed by a temporary RocksDB snapshot and
//! helpers for building stores with synthetic embeddings.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use vstore_embeddings::{EmbeddingError, FnEmbedder};
use vstore_index::{Document, JsonSizeEstimator, SizeEstimator, VectorStorage};
use vstore_storage::RocksSnapshotStore;

pub type Doc = Document<Value>;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// RocksDB snapshot directory
    pub db_path: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with a temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("db");
        std::fs::create_dir_all(&db_path).expect("Failed to create db dir");

        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Open the RocksDB snapshot backend. Only one handle may be open at a time.
    pub fn snapshots(&self) -> RocksSnapshotStore {
        RocksSnapshotStore::open(&self.db_path).expect("Failed to open snapshot store")
    }

    /// Open a RocksDB-backed store with the given provider and budget.
    pub fn open_storage(
        &self,
        embedder: SyntheticEmbedder,
        max_size_in_mb: f64,
    ) -> VectorStorage<Value> {
        self.open_storage_with(embedder, max_size_in_mb, JsonSizeEstimator)
    }

    /// Open a RocksDB-backed store with a custom size estimator.
    pub fn open_storage_with(
        &self,
        embedder: SyntheticEmbedder,
        max_size_in_mb: f64,
        estimator: impl SizeEstimator<Value> + 'static,
    ) -> VectorStorage<Value> {
        VectorStorage::builder()
            .embedding_provider(Arc::new(embedder.into_provider()))
            .snapshot_store(self.snapshots())
            .size_estimator(estimator)
            .max_size_in_mb(max_size_in_mb)
            .build()
            .expect("Failed to build vector storage")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Embedder answering from a fixed text -> vector table.
///
/// Unknown texts fail the whole batch, like a provider rejecting input.
#[derive(Clone, Default)]
pub struct SyntheticEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    calls: Arc<AtomicUsize>,
}

impl SyntheticEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of batch calls made so far, shared across clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn into_provider(self) -> FnEmbedder {
        FnEmbedder::from_sync(move |texts| {
            self.calls.fetch_add(1, Ordering::SeqCst);
            texts
                .iter()
                .map(|text| {
                    self.vectors
                        .get(text)
                        .cloned()
                        .ok_or_else(|| EmbeddingError::Provider(format!("unknown text: {}", text)))
                })
                .collect()
        })
    }
}

/// The x/y/z table: x = [1,0], y = [0,1], z = [1,1].
pub fn xyz_embedder() -> SyntheticEmbedder {
    SyntheticEmbedder::new(&[
        ("x", vec![1.0, 0.0]),
        ("y", vec![0.0, 1.0]),
        ("z", vec![1.0, 1.0]),
    ])
}

/// `count` texts `d1..` with unit vectors of identical serialized length.
///
/// Keep `count` below 10 so every text has the same length.
pub fn uniform_embedder(count: usize) -> SyntheticEmbedder {
    let entries: Vec<(String, Vec<f32>)> = (1..=count)
        .map(|i| {
            let vector = if i % 2 == 0 {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            };
            (format!("d{}", i), vector)
        })
        .collect();
    let borrowed: Vec<(&str, Vec<f32>)> = entries
        .iter()
        .map(|(text, vector)| (text.as_str(), vector.clone()))
        .collect();
    SyntheticEmbedder::new(&borrowed)
}

/// Estimated size (MB) of `count` uniform documents as the store would hold them.
pub fn uniform_budget(count: usize) -> f64 {
    let docs: Vec<Doc> = (1..=count)
        .map(|i| {
            Document::with_embedding(format!("d{}", i), json!({}), vec![1.0, 0.0], 1_700_000_000_000)
        })
        .collect();
    JsonSizeEstimator.estimate_mb(&docs)
}

/// One document per resident unit of budget.
pub fn per_document(docs: &[Doc]) -> f64 {
    docs.len() as f64
}

pub fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

pub fn empty_metadata(count: usize) -> Vec<Value> {
    vec![json!({}); count]
}

/// Resident texts in collection order.
pub fn resident_texts(storage: &VectorStorage<Value>) -> Vec<String> {
    storage.documents().iter().map(|d| d.text.clone()).collect()
}
