//! Distance metrics for dense feature vectors.
//!
//! A single shared definition of the metrics used across the index
//! strategies. Cosine distance is `1 - cos(a, b)` with the similarity
//! clamped to `[-1, 1]` before the subtraction, absorbing floating-point
//! overshoot so results always land in `[0, 2]`.
//!
//! Length mismatches surface as [`RetrievalError::DimensionMismatch`]
//! rather than a sentinel value, so a malformed comparison can never rank.

use serde::{Deserialize, Serialize};

use crate::error::{RetrievalError, Result};
use crate::vector::EPSILON;

/// Metric used by a query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryMetric {
    /// Cosine distance `1 - cos(a, b)`, range `[0, 2]`.
    Cosine,
    /// Euclidean (L2) distance.
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
}

impl QueryMetric {
    /// Compute the distance between two vectors under this metric.
    #[inline]
    pub fn distance(self, a: &[f64], b: &[f64]) -> Result<f64> {
        match self {
            QueryMetric::Cosine => cosine_distance(a, b),
            QueryMetric::Euclidean => euclidean_distance(a, b),
            QueryMetric::Manhattan => manhattan_distance(a, b),
        }
    }
}

fn check_pair(a: &[f64], b: &[f64]) -> Result<()> {
    if a.is_empty() || b.is_empty() {
        return Err(RetrievalError::InvalidArgument(
            "vectors cannot be empty".to_string(),
        ));
    }
    if a.len() != b.len() {
        return Err(RetrievalError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Cosine distance `1 - cos(a, b)`.
///
/// A near-zero-norm input has no direction and is maximally dissimilar to
/// everything; the distance is then exactly 1.0.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_pair(a, b)?;

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a < EPSILON || norm_b < EPSILON {
        log::warn!(
            "near-zero norm in cosine distance ({:e} / {:e}), returning maximum dissimilarity",
            norm_a.sqrt(),
            norm_b.sqrt()
        );
        return Ok(1.0);
    }

    let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    Ok(1.0 - similarity)
}

/// Euclidean (L2) distance.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_pair(a, b)?;
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum();
    Ok(sum.sqrt())
}

/// Manhattan (L1) distance.
pub fn manhattan_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_pair(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum())
}
