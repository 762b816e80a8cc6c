//! Size estimation for the eviction budget.

use serde::Serialize;
use tracing::warn;

use vstore_types::Document;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Estimates the resident size of a whole collection, in MB.
///
/// Any `Fn(&[Document<T>]) -> f64` closure is an estimator.
pub trait SizeEstimator<T>: Send + Sync {
    fn estimate_mb(&self, documents: &[Document<T>]) -> f64;
}

impl<T, F> SizeEstimator<T> for F
where
    F: Fn(&[Document<T>]) -> f64 + Send + Sync,
{
    fn estimate_mb(&self, documents: &[Document<T>]) -> f64 {
        self(documents)
    }
}

/// Default estimator: length of the collection serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSizeEstimator;

impl<T: Serialize> SizeEstimator<T> for JsonSizeEstimator {
    fn estimate_mb(&self, documents: &[Document<T>]) -> f64 {
        match serde_json::to_vec(documents) {
            Ok(bytes) => bytes.len() as f64 / BYTES_PER_MB,
            Err(e) => {
                warn!(error = %e, "Could not serialize collection for size estimate");
                0.0
            }
        }
    }
}
