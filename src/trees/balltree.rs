//! Ball tree construction.
//!
//! Hierarchical hypersphere partitioning: each node covers its records with
//! a bounding ball (centroid + radius), and internal nodes split their
//! records around an approximate farthest pair. Better suited than a K-D
//! tree for medium dimensions, where axis-aligned splits lose their bite.
//!
//! # References
//!
//! - Omohundro (1989): "Five balltree construction algorithms"
//! - Liu et al. (2006): "An investigation of practical approximate nearest
//!   neighbor algorithms"

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::distance::euclidean_distance;
use crate::error::{RetrievalError, Result};
use crate::feature::FeatureRecord;

/// Default maximum number of records per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 50;

const DEFAULT_SEED: u64 = 42;

/// Ball tree construction parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BallTreeParams {
    /// Maximum number of records per leaf.
    pub leaf_size: usize,
    /// Seed for split-point selection, so builds are reproducible.
    pub seed: u64,
}

impl Default for BallTreeParams {
    fn default() -> Self {
        Self {
            leaf_size: DEFAULT_LEAF_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

/// A node of the ball tree.
///
/// Every record reachable from a node lies within `radius` of `centroid`.
/// Internal nodes always carry both children once the builder returns.
#[derive(Debug)]
pub enum BallTreeNode {
    Leaf {
        centroid: Vec<f64>,
        radius: f64,
        /// Never empty.
        records: Vec<Arc<FeatureRecord>>,
    },
    Internal {
        centroid: Vec<f64>,
        radius: f64,
        left: Box<BallTreeNode>,
        right: Box<BallTreeNode>,
    },
}

impl BallTreeNode {
    pub fn centroid(&self) -> &[f64] {
        match self {
            BallTreeNode::Leaf { centroid, .. } | BallTreeNode::Internal { centroid, .. } => {
                centroid
            }
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            BallTreeNode::Leaf { radius, .. } | BallTreeNode::Internal { radius, .. } => *radius,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BallTreeNode::Leaf { .. })
    }

    /// Number of records in this subtree.
    pub fn record_count(&self) -> usize {
        match self {
            BallTreeNode::Leaf { records, .. } => records.len(),
            BallTreeNode::Internal { left, right, .. } => {
                left.record_count() + right.record_count()
            }
        }
    }
}

/// Builds ball trees with a bounded leaf size.
#[derive(Debug)]
pub struct BallTreeBuilder {
    params: BallTreeParams,
    rng: StdRng,
}

impl Default for BallTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BallTreeBuilder {
    /// Builder with default parameters.
    pub fn new() -> Self {
        let params = BallTreeParams::default();
        Self {
            rng: StdRng::seed_from_u64(params.seed),
            params,
        }
    }

    /// Builder with explicit parameters. The leaf size must be positive.
    pub fn with_params(params: BallTreeParams) -> Result<Self> {
        if params.leaf_size == 0 {
            return Err(RetrievalError::InvalidArgument(
                "leaf size must be positive".to_string(),
            ));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(params.seed),
            params,
        })
    }

    pub fn leaf_size(&self) -> usize {
        self.params.leaf_size
    }

    /// Build a tree; returns `None` for an empty input.
    ///
    /// Fails with [`RetrievalError::DimensionMismatch`] if the records do
    /// not share one dimension.
    pub fn build(&mut self, records: &[Arc<FeatureRecord>]) -> Result<Option<BallTreeNode>> {
        if records.is_empty() {
            return Ok(None);
        }
        log::debug!(
            "building ball tree over {} records, leaf size {}",
            records.len(),
            self.params.leaf_size
        );
        self.build_recursive(records.to_vec()).map(Some)
    }

    fn build_recursive(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<BallTreeNode> {
        let centroid = centroid_of(&records)?;
        let radius = radius_of(&records, &centroid)?;

        if records.len() <= self.params.leaf_size {
            return Ok(BallTreeNode::Leaf {
                centroid,
                radius,
                records,
            });
        }

        let (left_records, right_records) = self.split(records)?;
        let left = self.build_recursive(left_records)?;
        let right = self.build_recursive(right_records)?;

        Ok(BallTreeNode::Internal {
            centroid,
            radius,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Partition around an approximate diameter pair: a random record,
    /// the record farthest from it, then the record farthest from that.
    fn split(
        &mut self,
        records: Vec<Arc<FeatureRecord>>,
    ) -> Result<(Vec<Arc<FeatureRecord>>, Vec<Arc<FeatureRecord>>)> {
        let start = self.rng.gen_range(0..records.len());
        let p2 = farthest_from(&records, records[start].vector())?;
        let p1 = farthest_from(&records, p2.vector())?;

        let mut left = Vec::new();
        let mut right = Vec::new();
        for record in &records {
            let to_p1 = euclidean_distance(record.vector(), p1.vector())?;
            let to_p2 = euclidean_distance(record.vector(), p2.vector())?;
            if to_p1 <= to_p2 {
                left.push(record.clone());
            } else {
                right.push(record.clone());
            }
        }

        // All records equidistant from both pivots: fall back to a
        // shuffled balanced split.
        if left.is_empty() || right.is_empty() {
            let mut shuffled = records;
            shuffled.shuffle(&mut self.rng);
            let tail = shuffled.split_off(shuffled.len() / 2);
            return Ok((shuffled, tail));
        }

        Ok((left, right))
    }
}

fn centroid_of(records: &[Arc<FeatureRecord>]) -> Result<Vec<f64>> {
    let dimensions = records[0].dimension();
    let mut centroid = vec![0.0; dimensions];

    for record in records {
        if record.dimension() != dimensions {
            return Err(RetrievalError::DimensionMismatch {
                left: dimensions,
                right: record.dimension(),
            });
        }
        for (sum, x) in centroid.iter_mut().zip(record.vector()) {
            *sum += x;
        }
    }

    let count = records.len() as f64;
    for sum in centroid.iter_mut() {
        *sum /= count;
    }
    Ok(centroid)
}

fn radius_of(records: &[Arc<FeatureRecord>], centroid: &[f64]) -> Result<f64> {
    let mut max_radius: f64 = 0.0;
    for record in records {
        max_radius = max_radius.max(euclidean_distance(record.vector(), centroid)?);
    }
    Ok(max_radius)
}

fn farthest_from(
    records: &[Arc<FeatureRecord>],
    origin: &[f64],
) -> Result<Arc<FeatureRecord>> {
    let mut best = records[0].clone();
    let mut best_distance = -1.0;
    for record in records {
        let distance = euclidean_distance(record.vector(), origin)?;
        if distance > best_distance {
            best_distance = distance;
            best = record.clone();
        }
    }
    Ok(best)
}
