//! Index strategies and their shared contract.
//!
//! Four interchangeable strategies answer the same question, up to `k`
//! records in ascending distance from a query vector:
//!
//! - [`LinearScanIndex`]: exact, cosine, concurrent insert.
//! - [`BestBinFirstIndex`]: K-D tree, approximate, bounded per-query work.
//! - [`BallTreeIndex`]: bounding-sphere branch and bound, Euclidean.
//! - [`LshIndex`]: random-projection hashing, angular similarity.
//!
//! [`Capabilities`] describes what each type supports so callers can pick
//! a strategy at runtime without trial and error.

pub mod balltree;
pub mod best_bin_first;
pub mod linear;
pub mod lsh;

pub use balltree::BallTreeIndex;
pub use best_bin_first::{BestBinFirstIndex, BestBinFirstParams};
pub use linear::LinearScanIndex;
pub use lsh::{LshIndex, LshParams};

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::error::{RetrievalError, Result};
use crate::feature::FeatureRecord;

/// What an index strategy supports, fixed per type at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub insertable: bool,
    pub buildable: bool,
    pub searchable: bool,
}

/// Uniform contract over the index strategies.
pub trait VectorIndex {
    /// Capability descriptor for runtime strategy selection.
    fn capabilities(&self) -> Capabilities;

    /// (Re)build the index from a batch of records, replacing any prior
    /// contents.
    fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()>;

    /// Up to `k` records in ascending distance from `query`.
    fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>>;

    /// Number of indexed records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Indexes that accept single-record insertion without a rebuild.
pub trait InsertableIndex: VectorIndex {
    /// Append one record. Safe to call from multiple threads.
    fn insert(&self, record: Arc<FeatureRecord>) -> Result<()>;
}

pub(crate) fn check_query_args(query: &[f64], k: usize) -> Result<()> {
    if query.is_empty() {
        return Err(RetrievalError::InvalidArgument(
            "query vector cannot be empty".to_string(),
        ));
    }
    if k == 0 {
        return Err(RetrievalError::InvalidArgument(
            "k must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Max-heap entry over candidate results: `peek` is the current worst,
/// so a full heap evicts in O(log k).
pub(crate) struct RankedRecord {
    pub record: Arc<FeatureRecord>,
    pub distance: f64,
}

impl PartialEq for RankedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for RankedRecord {}

impl PartialOrd for RankedRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

/// Drain a result heap into a list ascending by distance.
pub(crate) fn into_ranked_list(heap: BinaryHeap<RankedRecord>) -> Vec<Arc<FeatureRecord>> {
    heap.into_sorted_vec()
        .into_iter()
        .map(|entry| entry.record)
        .collect()
}
