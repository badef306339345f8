//! eikon: content-based image retrieval primitives.
//!
//! In-memory vector indexes answering k-nearest-neighbor queries over
//! (id, vector) feature records, plus the numeric kernel they rest on
//! (normalization, distance metrics, vector statistics).
//!
//! # Which index should I use?
//!
//! | Situation | Strategy |
//! |-----------|----------|
//! | Exact results, live inserts | [`LinearScanIndex`] |
//! | Low dimensions, predictable query cost | [`BestBinFirstIndex`] |
//! | Medium dimensions, Euclidean | [`BallTreeIndex`] |
//! | High dimensions, angular similarity | [`LshIndex`] |
//!
//! The approximate strategies trade accuracy for speed and say so.
//! Best-bin-first stops after a fixed node budget, while the ball tree
//! prunes whole subtrees with bounding spheres and LSH ranks only the
//! records that collide with the query in some hash bucket.
//!
//! # Concurrency
//!
//! Build once, then query from as many threads as you like. The linear
//! index additionally takes concurrent inserts behind a read-write lock;
//! the tree and LSH indexes are immutable after `build`.
//!
//! ```rust
//! use std::sync::Arc;
//! use eikon::{FeatureRecord, LinearScanIndex};
//!
//! # fn main() -> eikon::Result<()> {
//! let index = LinearScanIndex::new();
//! index.insert(Arc::new(FeatureRecord::new("a", vec![1.0, 0.0])?))?;
//! index.insert(Arc::new(FeatureRecord::new("b", vec![0.0, 1.0])?))?;
//!
//! let hits = index.query(&[1.0, 0.1], 1)?;
//! assert_eq!(hits[0].id(), "a");
//! # Ok(())
//! # }
//! ```

pub mod distance;
pub mod error;
pub mod feature;
pub mod index;
pub mod trees;
pub mod vector;

pub use distance::QueryMetric;
pub use error::{Result, RetrievalError};
pub use feature::FeatureRecord;
pub use index::{
    BallTreeIndex, BestBinFirstIndex, BestBinFirstParams, Capabilities, InsertableIndex,
    LinearScanIndex, LshIndex, LshParams, VectorIndex,
};
pub use trees::balltree::BallTreeParams;
