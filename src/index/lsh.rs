//! Random-projection LSH index.
//!
//! `L` independent hash tables, each reducing a vector to a `K`-bit
//! signature: bit `j` is the sign of the dot product with the `j`-th
//! random hyperplane normal. Angularly close vectors collide with high
//! probability, so the union of the query's buckets across tables is a
//! small candidate set that is then re-ranked by exact cosine distance.
//!
//! # References
//!
//! - Indyk & Motwani (1998): "Approximate nearest neighbors: towards
//!   removing the curse of dimensionality"
//! - Charikar (2002): "Similarity estimation techniques from rounding
//!   algorithms"

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::distance::cosine_distance;
use crate::error::{RetrievalError, Result};
use crate::feature::FeatureRecord;
use crate::index::{check_query_args, Capabilities, VectorIndex};
use crate::vector;

/// Default number of hash tables (`L`). More tables, better recall.
pub const DEFAULT_TABLES: usize = 10;

/// Default signature bits per table (`K`). More bits, smaller buckets.
pub const DEFAULT_BITS: usize = 8;

/// LSH construction parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LshParams {
    /// Number of independent hash tables (`L`).
    pub tables: usize,
    /// Signature bits per table (`K`).
    pub bits: usize,
    /// Seed for the projection RNG, so builds are reproducible.
    pub seed: u64,
}

impl Default for LshParams {
    fn default() -> Self {
        Self {
            tables: DEFAULT_TABLES,
            bits: DEFAULT_BITS,
            seed: 42,
        }
    }
}

/// One hash table: `K` hyperplane normals plus the bucket map.
#[derive(Debug)]
struct LshTable {
    /// `K` random projection vectors, each L2-normalized.
    projections: Vec<Vec<f64>>,
    /// Signature -> records hashed to it. Every indexed record sits in
    /// exactly one bucket per table.
    buckets: HashMap<String, Vec<Arc<FeatureRecord>>>,
}

impl LshTable {
    fn signature(&self, vector: &[f64]) -> String {
        let mut signature = String::with_capacity(self.projections.len());
        for projection in &self.projections {
            let dot: f64 = vector.iter().zip(projection).map(|(x, y)| x * y).sum();
            signature.push(if dot >= 0.0 { '1' } else { '0' });
        }
        signature
    }
}

/// Random-projection LSH index over cosine similarity.
///
/// Insertion is not offered: the projections are calibrated at build time,
/// and the strategy keeps its semantics clean by rebuilding instead of
/// re-hashing single records into frozen tables.
#[derive(Debug)]
pub struct LshIndex {
    params: LshParams,
    tables: Vec<LshTable>,
    dimensions: usize,
    size: usize,
}

impl Default for LshIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LshIndex {
    pub const CAPABILITIES: Capabilities = Capabilities {
        insertable: false,
        buildable: true,
        searchable: true,
    };

    /// Index with default parameters (10 tables, 8 bits).
    pub fn new() -> Self {
        Self {
            params: LshParams::default(),
            tables: Vec::new(),
            dimensions: 0,
            size: 0,
        }
    }

    /// Index with explicit parameters. Table and bit counts must be
    /// positive.
    pub fn with_params(params: LshParams) -> Result<Self> {
        if params.tables == 0 || params.bits == 0 {
            return Err(RetrievalError::InvalidArgument(
                "table and bit counts must be positive".to_string(),
            ));
        }
        Ok(Self {
            params,
            tables: Vec::new(),
            dimensions: 0,
            size: 0,
        })
    }

    pub fn params(&self) -> LshParams {
        self.params
    }

    /// Build the hash tables, replacing any prior contents. An empty
    /// batch leaves the index unbuilt.
    pub fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        self.tables.clear();
        self.dimensions = 0;
        self.size = 0;
        if records.is_empty() {
            log::debug!("lsh build with no records, index stays empty");
            return Ok(());
        }

        let dimensions = records[0].dimension();
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        for _ in 0..self.params.tables {
            let mut projections = Vec::with_capacity(self.params.bits);
            for _ in 0..self.params.bits {
                let mut projection: Vec<f64> = (0..dimensions)
                    .map(|_| rng.sample(StandardNormal))
                    .collect();
                vector::normalize(&mut projection)?;
                projections.push(projection);
            }
            self.tables.push(LshTable {
                projections,
                buckets: HashMap::new(),
            });
        }

        for record in &records {
            if record.dimension() != dimensions {
                self.tables.clear();
                return Err(RetrievalError::DimensionMismatch {
                    left: dimensions,
                    right: record.dimension(),
                });
            }
            let hashed = prepared(record)?;
            for table in &mut self.tables {
                let signature = table.signature(&hashed);
                table
                    .buckets
                    .entry(signature)
                    .or_default()
                    .push(record.clone());
            }
        }

        self.dimensions = dimensions;
        self.size = records.len();
        log::debug!(
            "lsh index built: {} records, {} tables x {} bits",
            self.size,
            self.params.tables,
            self.params.bits
        );
        Ok(())
    }

    /// Collect the query's bucket in every table, dedup, re-rank by exact
    /// cosine distance and return the top `k`. No collisions anywhere
    /// yields an empty result.
    pub fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        check_query_args(query, k)?;
        if self.tables.is_empty() {
            return Err(RetrievalError::IndexNotReady);
        }
        if query.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                left: query.len(),
                right: self.dimensions,
            });
        }

        let query = if vector::is_normalized(query)? {
            query.to_vec()
        } else {
            log::warn!("query vector is not normalized, hashing a normalized copy");
            vector::normalized_copy(query)?
        };

        // Candidates keep first-seen table order, so fixed-seed queries
        // return identical lists even across distance ties.
        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates: Vec<&Arc<FeatureRecord>> = Vec::new();
        for table in &self.tables {
            let signature = table.signature(&query);
            if let Some(bucket) = table.buckets.get(&signature) {
                for record in bucket {
                    if seen.insert(record.id()) {
                        candidates.push(record);
                    }
                }
            }
        }

        if candidates.is_empty() {
            log::debug!("no lsh bucket collisions for query");
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(Arc<FeatureRecord>, f64)> = candidates
            .into_iter()
            .map(|record| {
                let distance = cosine_distance(&query, record.vector())?;
                Ok((record.clone(), distance))
            })
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);
        Ok(ranked.into_iter().map(|(record, _)| record).collect())
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Sum of bucket sizes in table `table`, for diagnostics.
    pub fn bucketed_count(&self, table: usize) -> Option<usize> {
        self.tables
            .get(table)
            .map(|t| t.buckets.values().map(Vec::len).sum())
    }
}

/// Hash a normalized view of the record without mutating caller data.
fn prepared(record: &FeatureRecord) -> Result<Vec<f64>> {
    if vector::is_normalized(record.vector())? {
        Ok(record.vector().to_vec())
    } else {
        log::warn!(
            "record {} is not normalized, hashing a normalized copy",
            record.id()
        );
        vector::normalized_copy(record.vector())
    }
}

impl VectorIndex for LshIndex {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        LshIndex::build(self, records)
    }

    fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        LshIndex::query(self, query, k)
    }

    fn len(&self) -> usize {
        LshIndex::len(self)
    }
}
