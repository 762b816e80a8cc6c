//! Cosine similarity scoring.
//!
//! Scores are normalized from [-1, 1] to [0, 1]: 1.0 means same direction,
//! 0.5 orthogonal, 0.0 opposite. A zero-magnitude vector has no direction
//! and scores a raw 0.

pub use vstore_types::magnitude;

use crate::error::IndexError;

/// Fail fast when two vectors come from different models.
pub fn check_dimension(expected: usize, actual: usize) -> Result<(), IndexError> {
    if expected != actual {
        return Err(IndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Raw cosine similarity in [-1, 1], given precomputed magnitudes.
///
/// Callers must check that `a` and `b` have equal length.
pub fn cosine_with_magnitudes(a: &[f32], a_mag: f32, b: &[f32], b_mag: f32) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let denominator = a_mag * b_mag;
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (dot / denominator).clamp(-1.0, 1.0)
}

/// Raw cosine similarity in [-1, 1].
pub fn cosine_raw(a: &[f32], b: &[f32]) -> Result<f32, IndexError> {
    check_dimension(a.len(), b.len())?;
    Ok(cosine_with_magnitudes(a, magnitude(a), b, magnitude(b)))
}

/// Map a raw cosine from [-1, 1] to [0, 1].
pub fn normalize(raw: f32) -> f32 {
    (raw + 1.0) / 2.0
}

/// Normalized similarity between two vectors with known magnitudes.
pub fn score(query: &[f32], query_mag: f32, candidate: &[f32], candidate_mag: f32) -> f32 {
    normalize(cosine_with_magnitudes(
        query,
        query_mag,
        candidate,
        candidate_mag,
    ))
}
