//! Similarity search E2E tests for vector-storage.
//!
//! Insert -> embed -> rank -> hit update -> snapshot, over a RocksDB backend.

use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::{empty_metadata, strings, xyz_embedder, TestHarness};
use vstore_index::{FilterCriteria, FilterOptions, QueryParams, SnapshotStatus};

/// x/y/z with [1,0], [0,1], [1,1]; querying x with k=1 returns x at score 1.0.
#[tokio::test]
async fn test_xyz_query_returns_exact_match() {
    // 1. Store with room for all three documents
    let harness = TestHarness::new();
    let mut storage = harness.open_storage(xyz_embedder(), 1.0);

    // 2. Insert
    let inserted = storage
        .add_texts(strings(&["x", "y", "z"]), empty_metadata(3))
        .await
        .unwrap();
    assert_eq!(inserted.added.len(), 3);
    assert_eq!(inserted.snapshot, SnapshotStatus::Saved);

    // 3. Query with the x embedding
    let outcome = storage
        .similarity_search(QueryParams::new("x").with_k(1))
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].text(), "x");
    assert_eq!(outcome.results[0].score, 1.0);
    assert_eq!(outcome.query.embedding, vec![1.0, 0.0]);

    // 4. Hit recorded on the resident record
    assert_eq!(storage.documents()[0].hits, 1);
    assert_eq!(storage.stats().total_hits, 1);
}

/// Same resident set and query embedding give the same ordered results.
#[tokio::test]
async fn test_ranking_is_deterministic() {
    let harness = TestHarness::new();
    let mut storage = harness.open_storage(xyz_embedder(), 1.0);
    storage
        .add_texts(strings(&["y", "z", "x"]), empty_metadata(3))
        .await
        .unwrap();

    let mut rankings = Vec::new();
    for _ in 0..3 {
        let outcome = storage
            .similarity_search(QueryParams::new("z").with_k(3))
            .await
            .unwrap();
        let ranked: Vec<(String, f32)> = outcome
            .results
            .iter()
            .map(|r| (r.text().to_string(), r.score))
            .collect();
        rankings.push(ranked);
    }

    assert_eq!(rankings[0], rankings[1]);
    assert_eq!(rankings[1], rankings[2]);

    // y and x tie against z; collection order decides
    let texts: Vec<&str> = rankings[0].iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(texts, vec!["z", "y", "x"]);
    assert!(storage.documents().iter().all(|d| d.hits == 3));
}

/// Returned copies are stripped of vectors unless asked for.
#[tokio::test]
async fn test_vectors_stripped_from_results_only() {
    let harness = TestHarness::new();
    let mut storage = harness.open_storage(xyz_embedder(), 1.0);
    storage
        .add_texts(strings(&["x"]), empty_metadata(1))
        .await
        .unwrap();

    let stripped = storage
        .similarity_search(QueryParams::new("x"))
        .await
        .unwrap();
    assert!(!stripped.results[0].document.has_embedding());
    assert!(storage.documents()[0].has_embedding());

    let full = storage
        .similarity_search(QueryParams::new("x").include_vectors(true))
        .await
        .unwrap();
    assert_eq!(full.results[0].document.vector, Some(vec![1.0, 0.0]));
    assert_eq!(full.results[0].document.hits, 2);
}

/// include text in {a, b}, exclude metadata.flag == true.
#[tokio::test]
async fn test_filtered_search() {
    let harness = TestHarness::new();
    let embedder = e2e_tests::SyntheticEmbedder::new(&[
        ("a", vec![1.0, 0.0]),
        ("b", vec![0.9, 0.1]),
        ("c", vec![1.0, 0.0]),
        ("q", vec![1.0, 0.0]),
    ]);
    let mut storage = harness.open_storage(embedder, 1.0);
    storage
        .add_texts(
            strings(&["a", "b", "c"]),
            vec![
                json!({"flag": true}),
                json!({"flag": false}),
                json!({"flag": false}),
            ],
        )
        .await
        .unwrap();

    let filter = FilterOptions::new()
        .include(FilterCriteria::new().with_text(vec!["a", "b"]))
        .exclude(FilterCriteria::new().with_metadata("flag", true));
    let outcome = storage
        .similarity_search(QueryParams::new("q").with_filter(filter))
        .await
        .unwrap();

    let texts: Vec<&str> = outcome.results.iter().map(|r| r.text()).collect();
    assert_eq!(texts, vec!["b"]);
    assert_eq!(storage.documents()[0].hits, 0);
    assert_eq!(storage.documents()[1].hits, 1);
}

/// A query matching nothing writes no snapshot and touches no hits.
#[tokio::test]
async fn test_empty_result_has_no_side_effects() {
    let harness = TestHarness::new();
    let mut storage = harness.open_storage(xyz_embedder(), 1.0);
    storage
        .add_texts(strings(&["x", "y"]), empty_metadata(2))
        .await
        .unwrap();

    let filter = FilterOptions::new().include(FilterCriteria::new().with_text("z"));
    let outcome = storage
        .similarity_search(QueryParams::new("x").with_filter(filter))
        .await
        .unwrap();

    assert!(outcome.results.is_empty());
    assert_eq!(outcome.snapshot, SnapshotStatus::Skipped);
    assert_eq!(storage.stats().total_hits, 0);
}
