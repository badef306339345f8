//! Branch-and-bound KNN over a ball tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::distance::euclidean_distance;
use crate::error::{RetrievalError, Result};
use crate::feature::FeatureRecord;
use crate::index::{check_query_args, into_ranked_list, Capabilities, RankedRecord, VectorIndex};
use crate::trees::balltree::{BallTreeBuilder, BallTreeNode, BallTreeParams};

/// Euclidean KNN over a ball tree.
///
/// Subtrees are visited in order of the least distance any of their records
/// could have, `max(0, d(q, centroid) - radius)`, and the walk stops once
/// that bound is no better than the current k-th result. The bound rests on
/// the Euclidean triangle inequality, so this index is Euclidean-only.
#[derive(Debug)]
pub struct BallTreeIndex {
    builder: BallTreeBuilder,
    root: Option<BallTreeNode>,
    size: usize,
}

/// Frontier entry; the heap pops the smallest lower bound first.
struct Bound<'a> {
    node: &'a BallTreeNode,
    lower: f64,
}

impl PartialEq for Bound<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Bound<'_> {}

impl PartialOrd for Bound<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.lower.total_cmp(&self.lower)
    }
}

impl Default for BallTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl BallTreeIndex {
    pub const CAPABILITIES: Capabilities = Capabilities {
        insertable: false,
        buildable: true,
        searchable: true,
    };

    /// Index with the default leaf size.
    pub fn new() -> Self {
        Self {
            builder: BallTreeBuilder::new(),
            root: None,
            size: 0,
        }
    }

    /// Index with explicit construction parameters.
    pub fn with_params(params: BallTreeParams) -> Result<Self> {
        Ok(Self {
            builder: BallTreeBuilder::with_params(params)?,
            root: None,
            size: 0,
        })
    }

    /// Build the tree, replacing any prior tree. An empty batch leaves
    /// the index unbuilt.
    pub fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        self.root = self.builder.build(&records)?;
        self.size = records.len();
        Ok(())
    }

    /// Up to `k` records in ascending Euclidean distance. `k` is clamped
    /// to the index size.
    pub fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        check_query_args(query, k)?;
        let root = self.root.as_ref().ok_or(RetrievalError::IndexNotReady)?;
        let k = k.min(self.size);

        let mut frontier: BinaryHeap<Bound> = BinaryHeap::new();
        let mut results: BinaryHeap<RankedRecord> = BinaryHeap::with_capacity(k + 1);
        frontier.push(Bound {
            node: root,
            lower: 0.0,
        });

        while let Some(Bound { node, lower }) = frontier.pop() {
            if results.len() == k {
                if let Some(worst) = results.peek() {
                    // Every remaining node is at least this far away.
                    if lower >= worst.distance {
                        break;
                    }
                }
            }

            match node {
                BallTreeNode::Leaf { records, .. } => {
                    for record in records {
                        let distance = euclidean_distance(query, record.vector())?;
                        if results.len() < k {
                            results.push(RankedRecord {
                                record: record.clone(),
                                distance,
                            });
                        } else {
                            let worst = results.peek().map_or(f64::INFINITY, |w| w.distance);
                            if distance < worst {
                                results.pop();
                                results.push(RankedRecord {
                                    record: record.clone(),
                                    distance,
                                });
                            }
                        }
                    }
                }
                BallTreeNode::Internal { left, right, .. } => {
                    for child in [left.as_ref(), right.as_ref()] {
                        let to_centroid = euclidean_distance(query, child.centroid())?;
                        let lower = (to_centroid - child.radius()).max(0.0);
                        frontier.push(Bound { node: child, lower });
                    }
                }
            }
        }

        Ok(into_ranked_list(results))
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl VectorIndex for BallTreeIndex {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        BallTreeIndex::build(self, records)
    }

    fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        BallTreeIndex::query(self, query, k)
    }

    fn len(&self) -> usize {
        BallTreeIndex::len(self)
    }
}
