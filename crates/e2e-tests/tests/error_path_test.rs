//! Error path E2E tests for vector-storage.
//!
//! Errors that would break an invariant abort before any mutation, and each
//! error reports who has to act on it.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::Value;

use e2e_tests::{empty_metadata, resident_texts, strings, xyz_embedder, TestHarness};
use vstore_embeddings::MockEmbedder;
use vstore_index::{ErrorKind, IndexError, QueryParams, VectorStorage};

#[test]
fn test_no_embedding_path_is_a_configuration_error() {
    let err = VectorStorage::<Value>::builder()
        .embedding_model("text-embedding-ada-002")
        .build()
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_arity_mismatch_rejected_before_side_effects() {
    let harness = TestHarness::new();
    let embedder = xyz_embedder();
    let mut storage = harness.open_storage(embedder.clone(), 1.0);

    let err = storage
        .add_texts(strings(&["x", "y"]), empty_metadata(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IndexError::ArityMismatch {
            texts: 2,
            metadatas: 1
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Caller);
    assert_eq!(embedder.call_count(), 0);
    assert!(storage.is_empty());
}

/// A provider failure on one text aborts the whole batch.
#[tokio::test]
async fn test_embedding_failure_is_all_or_nothing() {
    let harness = TestHarness::new();
    let mut storage = harness.open_storage(xyz_embedder(), 1.0);
    storage
        .add_texts(strings(&["x"]), empty_metadata(1))
        .await
        .unwrap();

    let err = storage
        .add_texts(strings(&["y", "unknown", "z"]), empty_metadata(3))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Provider);
    assert_eq!(resident_texts(&storage), vec!["x"]);

    let err = storage
        .similarity_search(QueryParams::new("unknown"))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Embedding(_)));
    assert_eq!(storage.documents()[0].hits, 0);
}

#[tokio::test]
async fn test_transient_provider_failure_is_retryable() {
    let mut storage = VectorStorage::<Value>::builder()
        .embedding_provider(Arc::new(MockEmbedder::failing()))
        .build()
        .unwrap();

    let err = storage.add_text("anything", Value::Null).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_empty_query_rejected() {
    let harness = TestHarness::new();
    let mut storage = harness.open_storage(xyz_embedder(), 1.0);

    let err = storage
        .similarity_search(QueryParams::new(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Caller);
}
