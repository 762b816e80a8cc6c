//! Least-valuable-first eviction under a size budget.
//!
//! While the estimated size of the collection exceeds the budget, the
//! document with the fewest hits is removed, oldest first among equals.
//! Candidates come from a min-heap built once per pass, so the collection is
//! never re-sorted and survivors keep their insertion order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use vstore_types::{Document, DEFAULT_MAX_SIZE_IN_MB};

use crate::size::{JsonSizeEstimator, SizeEstimator};

/// Size budget plus the estimator that measures against it.
pub struct EvictionPolicy<T> {
    max_size_in_mb: f64,
    estimator: Box<dyn SizeEstimator<T>>,
}

impl<T: Serialize + 'static> EvictionPolicy<T> {
    /// Budget measured with the default JSON size estimator.
    pub fn new(max_size_in_mb: f64) -> Self {
        Self::with_estimator(max_size_in_mb, JsonSizeEstimator)
    }
}

impl<T: Serialize + 'static> Default for EvictionPolicy<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE_IN_MB)
    }
}

impl<T> EvictionPolicy<T> {
    pub fn with_estimator(
        max_size_in_mb: f64,
        estimator: impl SizeEstimator<T> + 'static,
    ) -> Self {
        Self::with_boxed_estimator(max_size_in_mb, Box::new(estimator))
    }

    pub fn with_boxed_estimator(
        max_size_in_mb: f64,
        estimator: Box<dyn SizeEstimator<T>>,
    ) -> Self {
        Self {
            max_size_in_mb,
            estimator,
        }
    }

    pub fn max_size_in_mb(&self) -> f64 {
        self.max_size_in_mb
    }

    /// Estimated size of `documents` in MB.
    pub fn estimate_mb(&self, documents: &[Document<T>]) -> f64 {
        self.estimator.estimate_mb(documents)
    }

    /// Remove documents until the collection fits the budget.
    ///
    /// Returns the evicted documents in eviction order. Never fails: a budget
    /// smaller than a single document empties the collection.
    pub fn enforce(&self, documents: &mut Vec<Document<T>>) -> Vec<Document<T>> {
        let mut size = self.estimator.estimate_mb(documents);
        if size <= self.max_size_in_mb {
            return Vec::new();
        }

        let before = documents.len();
        let mut candidates: BinaryHeap<Reverse<(u64, i64, usize)>> = documents
            .iter()
            .enumerate()
            .map(|(position, doc)| Reverse((doc.hits, doc.timestamp, position)))
            .collect();

        // Original positions already removed, kept sorted
        let mut removed: Vec<usize> = Vec::new();
        let mut evicted = Vec::new();

        while size > self.max_size_in_mb {
            let Some(Reverse((hits, timestamp, original))) = candidates.pop() else {
                break;
            };
            let shift = removed.partition_point(|&r| r < original);
            let doc = documents.remove(original - shift);
            removed.insert(shift, original);

            debug!(
                text_len = doc.text.len(),
                hits,
                timestamp,
                "Evicted document"
            );
            evicted.push(doc);
            size = self.estimator.estimate_mb(documents);
        }

        info!(
            evicted = evicted.len(),
            remaining = documents.len(),
            before,
            size_mb = size,
            budget_mb = self.max_size_in_mb,
            "Eviction pass complete"
        );
        evicted
    }
}

impl<T> fmt::Debug for EvictionPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionPolicy")
            .field("max_size_in_mb", &self.max_size_in_mb)
            .finish_non_exhaustive()
    }
}
