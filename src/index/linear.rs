//! Exact linear-scan index with concurrent insert.

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;

use crate::distance::cosine_distance;
use crate::error::Result;
use crate::feature::FeatureRecord;
use crate::index::{check_query_args, Capabilities, InsertableIndex, VectorIndex};

/// Brute-force cosine KNN over an append-only record list.
///
/// The one mutable strategy: `build`, `insert` and `clear` take the write
/// lock, `query` and `len` the read lock, so any number of queries run
/// concurrently against a consistent snapshot while writers are exclusive.
/// An empty index answers queries with an empty list rather than an error.
#[derive(Debug, Default)]
pub struct LinearScanIndex {
    records: RwLock<Vec<Arc<FeatureRecord>>>,
}

impl LinearScanIndex {
    pub const CAPABILITIES: Capabilities = Capabilities {
        insertable: true,
        buildable: true,
        searchable: true,
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `records` atomically.
    pub fn build(&self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        let mut guard = self.records.write();
        *guard = records;
        log::debug!("linear index built with {} records", guard.len());
        Ok(())
    }

    /// Append a single record.
    pub fn insert(&self, record: Arc<FeatureRecord>) -> Result<()> {
        self.records.write().push(record);
        Ok(())
    }

    /// Rank every record by cosine distance to `query` and return the
    /// first `k`. Ties keep insertion order.
    ///
    /// Distance computations run on the rayon pool; they only read the
    /// immutable record vectors under the read lock.
    pub fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        check_query_args(query, k)?;

        let records = self.records.read();
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(Arc<FeatureRecord>, f64)> = records
            .par_iter()
            .map(|record| {
                let distance = cosine_distance(query, record.vector())?;
                Ok((record.clone(), distance))
            })
            .collect::<Result<Vec<_>>>()?;
        drop(records);

        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);
        Ok(ranked.into_iter().map(|(record, _)| record).collect())
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl VectorIndex for LinearScanIndex {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn build(&mut self, records: Vec<Arc<FeatureRecord>>) -> Result<()> {
        LinearScanIndex::build(self, records)
    }

    fn query(&self, query: &[f64], k: usize) -> Result<Vec<Arc<FeatureRecord>>> {
        LinearScanIndex::query(self, query, k)
    }

    fn len(&self) -> usize {
        LinearScanIndex::len(self)
    }
}

impl InsertableIndex for LinearScanIndex {
    fn insert(&self, record: Arc<FeatureRecord>) -> Result<()> {
        LinearScanIndex::insert(self, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;

    fn record(id: &str, vector: Vec<f64>) -> Arc<FeatureRecord> {
        Arc::new(FeatureRecord::new(id, vector).unwrap())
    }

    #[test]
    fn empty_index_returns_empty_list() {
        let index = LinearScanIndex::new();
        assert!(index.query(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
    }

    #[test]
    fn query_ranks_by_cosine_distance() {
        let index = LinearScanIndex::new();
        index
            .build(vec![
                record("a", vec![1.0, 0.0, 0.0]),
                record("b", vec![0.0, 1.0, 0.0]),
                record("c", vec![0.9, 0.1, 0.0]),
            ])
            .unwrap();

        let hits = index.query(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].id(), "a");
        assert_eq!(hits[1].id(), "c");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = LinearScanIndex::new();
        // b and c are both orthogonal to the query: identical distance.
        index
            .build(vec![
                record("a", vec![1.0, 0.0, 0.0]),
                record("b", vec![0.0, 1.0, 0.0]),
                record("c", vec![0.0, 0.0, 1.0]),
            ])
            .unwrap();

        let hits = index.query(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(hits[1].id(), "b");
        assert_eq!(hits[2].id(), "c");
    }

    #[test]
    fn build_replaces_prior_contents() {
        let index = LinearScanIndex::new();
        index.insert(record("old", vec![1.0, 0.0])).unwrap();
        index.build(vec![record("new", vec![0.0, 1.0])]).unwrap();

        assert_eq!(index.len(), 1);
        let hits = index.query(&[0.0, 1.0], 1).unwrap();
        assert_eq!(hits[0].id(), "new");
    }

    #[test]
    fn clear_empties_the_index() {
        let index = LinearScanIndex::new();
        index.insert(record("a", vec![1.0])).unwrap();
        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = LinearScanIndex::new();
        assert!(matches!(
            index.query(&[1.0], 0),
            Err(RetrievalError::InvalidArgument(_))
        ));
    }
}
