//! Best-bin-first search over a K-D tree.
//!
//! Bounded priority traversal: the most promising subtrees are visited
//! first and the walk stops after `max_checks` nodes, so per-query cost is
//! predictable and the result approximate.
//!
//! # References
//!
//! - Beis & Lowe (1997): "Shape indexing using approximate
//!   nearest-neighbour search in high-dimensional spaces"

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::distance::QueryMetric;
use crate::error::{RetrievalError, Result};
use crate::feature::FeatureRecord;
use crate::index::{check_query_args, into_ranked_list, Capabilities, RankedRecord, VectorIndex};
use crate::trees::kdtree::{KdNode, KdTreeBuilder};

/// Best-bin-first parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BestBinFirstParams {
    /// Upper bound on the number of tree nodes scored per query.
    pub max_checks: usize,
    /// Distance metric, cosine or Euclidean.
    ///
    /// Axis-aligned splits carry no usable bound under cosine, so with
    /// [`QueryMetric::Cosine`] the far-branch penalty is zero and the
    /// traversal degrades toward an exhaustive walk capped by
    /// `max_checks`. That is the intended accuracy/speed trade-off, not a
    /// defect.
    pub metric: QueryMetric,
}

impl Default for BestBinFirstParams {
    fn default() -> Self {
        Self {
            max_checks: 1000,
            metric: QueryMetric::Cosine,
        }
    }
}

/// K-D tree index searched best-bin-first.
#[derive(Debug)]
pub struct BestBinFirstIndex {
    params: BestBinFirstParams,
    root: Option<Box<KdNode>>,
    size: usize,
}

/// Frontier entry; the heap pops the smallest priority first.
struct Frontier<'a> {
    node: &'a KdNode,
    priority: f64,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority)
    }
}

impl Default for BestBinFirstIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl BestBinFirstIndex {
    pub const CAPABILITIES: Capabilities = Capabilities {
        insertable: false,
        buildable: true,
        searchable: true,
    };

    /// Index with default parameters (1000 checks, cosine).
    pub fn new() -> Self {
        Self {
            params: BestBinFirstParams::default(),
            root: None,
            size: 0,
        }
    }

    /// Index with explicit parameters.
    pub fn with_params(params: BestBinFirstParams) -> Result<Self> {
        if params.max_checks == 0 {
            return Err(RetrievalError::InvalidArgument(
                "max_checks must be positive".to_string(),
            ));
        }
        if params.metric == QueryMetric::Manhattan {
            return Err(RetrievalError::InvalidArgument(
                "best-bin-first supports cosine and euclidean metrics only".to_string(),
            ));
        }
        Ok(Self {
            params,
            root: None,
            size: 0,
        })
    }

    pub fn params(&self) -> BestBinFirstParams {
        self.params
    }

    /// Build the K-D tree, replacing any prior tree. An empty batch
    /// leaves the index unbuilt.
    pub fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        self.size = records.len();
        self.root = KdTreeBuilder::new().build(&records);
        log::debug!("k-d tree built over {} records", self.size);
        Ok(())
    }

    /// Up to `k` records in ascending distance, visiting at most
    /// `max_checks` tree nodes.
    pub fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        check_query_args(query, k)?;
        let root = self.root.as_deref().ok_or(RetrievalError::IndexNotReady)?;

        let mut frontier: BinaryHeap<Frontier> = BinaryHeap::new();
        let mut results: BinaryHeap<RankedRecord> = BinaryHeap::with_capacity(k + 1);
        frontier.push(Frontier {
            node: root,
            priority: 0.0,
        });

        let mut checks = 0;
        while checks < self.params.max_checks {
            let Some(entry) = frontier.pop() else { break };
            let node = entry.node;
            checks += 1;

            let record = node.record();
            let distance = self.params.metric.distance(query, record.vector())?;
            results.push(RankedRecord {
                record: record.clone(),
                distance,
            });
            if results.len() > k {
                results.pop();
            }

            let axis = node.axis();
            let split = record.vector()[axis];
            let query_value = query[axis];

            let (near, far) = if query_value < split {
                (node.left(), node.right())
            } else {
                (node.right(), node.left())
            };

            // The near side is always worth exploring.
            if let Some(near) = near {
                frontier.push(Frontier {
                    node: near,
                    priority: 0.0,
                });
            }
            if let Some(far) = far {
                let priority = match self.params.metric {
                    QueryMetric::Euclidean => {
                        let diff = query_value - split;
                        diff * diff
                    }
                    // No coordinate bound under cosine.
                    _ => 0.0,
                };
                frontier.push(Frontier {
                    node: far,
                    priority,
                });
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

impl VectorIndex for BestBinFirstIndex {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        BestBinFirstIndex::build(self, records)
    }

    fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        BestBinFirstIndex::query(self, query, k)
    }

    fn len(&self) -> usize {
        BestBinFirstIndex::len(self)
    }
}
