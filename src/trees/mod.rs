//! Space-partitioning trees backing the approximate indexes.

pub mod balltree;
pub mod kdtree;
