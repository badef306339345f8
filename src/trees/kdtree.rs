//! K-D tree construction.
//!
//! Median-split binary tree cycling the split axis with depth. The builder
//! stable-sorts by the axis coordinate and picks index `n / 2` as the split
//! point, so equal coordinates keep their input order and the tree is
//! deterministic for a given input sequence.
//!
//! # References
//!
//! - Bentley (1975): "Multidimensional binary search trees used for
//!   associative searching"

use std::sync::Arc;

use crate::feature::FeatureRecord;

/// One node of a K-D tree.
///
/// Invariant: every record in the left subtree has `vector[axis]` less than
/// or equal to this record's coordinate, every record on the right greater
/// than or equal.
#[derive(Debug)]
pub struct KdNode {
    record: Arc<FeatureRecord>,
    axis: usize,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

impl KdNode {
    pub fn record(&self) -> &Arc<FeatureRecord> {
        &self.record
    }

    /// The dimension this node splits on (`depth % D`).
    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }
}

/// Builds K-D trees over feature records.
#[derive(Debug, Default)]
pub struct KdTreeBuilder;

impl KdTreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a tree; returns `None` for an empty input.
    pub fn build(&self, records: &[Arc<FeatureRecord>]) -> Option<Box<KdNode>> {
        if records.is_empty() {
            return None;
        }
        let mut working: Vec<Arc<FeatureRecord>> = records.to_vec();
        Self::build_recursive(&mut working, 0)
    }

    fn build_recursive(records: &mut [Arc<FeatureRecord>], depth: usize) -> Option<Box<KdNode>> {
        if records.is_empty() {
            return None;
        }

        let dimensions = records[0].dimension();
        let axis = depth % dimensions;

        // Stable sort: ties on the split coordinate keep input order.
        records.sort_by(|a, b| a.vector()[axis].total_cmp(&b.vector()[axis]));
        let median = records.len() / 2;
        let record = records[median].clone();

        let (left_half, rest) = records.split_at_mut(median);
        let right_half = &mut rest[1..];

        Some(Box::new(KdNode {
            record,
            axis,
            left: Self::build_recursive(left_half, depth + 1),
            right: Self::build_recursive(right_half, depth + 1),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, vector: Vec<f64>) -> Arc<FeatureRecord> {
        Arc::new(FeatureRecord::new(id, vector).unwrap())
    }

    fn assert_split_invariant(node: &KdNode) {
        let axis = node.axis();
        let split = node.record().vector()[axis];
        if let Some(left) = node.left() {
            assert_subtree_bounded(left, axis, split, true);
            assert_split_invariant(left);
        }
        if let Some(right) = node.right() {
            assert_subtree_bounded(right, axis, split, false);
            assert_split_invariant(right);
        }
    }

    fn assert_subtree_bounded(node: &KdNode, axis: usize, split: f64, is_left: bool) {
        let value = node.record().vector()[axis];
        if is_left {
            assert!(value <= split, "left descendant {value} > split {split}");
        } else {
            assert!(value >= split, "right descendant {value} < split {split}");
        }
        if let Some(left) = node.left() {
            assert_subtree_bounded(left, axis, split, is_left);
        }
        if let Some(right) = node.right() {
            assert_subtree_bounded(right, axis, split, is_left);
        }
    }

    #[test]
    fn empty_input_builds_no_tree() {
        assert!(KdTreeBuilder::new().build(&[]).is_none());
    }

    #[test]
    fn single_record_is_the_root() {
        let root = KdTreeBuilder::new()
            .build(&[record("a", vec![1.0, 2.0])])
            .unwrap();
        assert_eq!(root.record().id(), "a");
        assert!(root.left().is_none());
        assert!(root.right().is_none());
    }

    #[test]
    fn split_invariant_holds_on_random_points() {
        let records: Vec<_> = (0..64)
            .map(|i| {
                let x = ((i * 37) % 64) as f64;
                let y = ((i * 53) % 64) as f64;
                let z = ((i * 11) % 64) as f64;
                record(&format!("p{i}"), vec![x, y, z])
            })
            .collect();

        let root = KdTreeBuilder::new().build(&records).unwrap();
        assert_split_invariant(&root);
    }
}
