//! Build every index strategy over a small corpus and run the same query
//! against each.
//!
//! Run with: `cargo run --example basic_search`

use std::sync::Arc;

use eikon::vector::normalized_copy;
use eikon::{
    BallTreeIndex, BestBinFirstIndex, FeatureRecord, LinearScanIndex, LshIndex, VectorIndex,
};

fn main() -> eikon::Result<()> {
    // Stand-in for externally extracted image descriptors.
    let raw: Vec<(&str, Vec<f64>)> = vec![
        ("sneaker-01.jpg", vec![0.9, 0.1, 0.0, 0.1]),
        ("sneaker-02.jpg", vec![0.8, 0.2, 0.1, 0.1]),
        ("boot-01.jpg", vec![0.1, 0.9, 0.2, 0.0]),
        ("boot-02.jpg", vec![0.2, 0.8, 0.1, 0.1]),
        ("sandal-01.jpg", vec![0.0, 0.1, 0.9, 0.3]),
        ("sandal-02.jpg", vec![0.1, 0.0, 0.8, 0.4]),
        ("heel-01.jpg", vec![0.2, 0.1, 0.3, 0.9]),
        ("heel-02.jpg", vec![0.1, 0.2, 0.2, 0.8]),
    ];

    let records: Vec<Arc<FeatureRecord>> = raw
        .into_iter()
        .map(|(id, v)| Ok(Arc::new(FeatureRecord::new(id, normalized_copy(&v)?)?)))
        .collect::<eikon::Result<_>>()?;
    println!("indexed {} images", records.len());

    let query = normalized_copy(&[0.85, 0.15, 0.05, 0.1])?;

    let mut strategies: Vec<(&str, Box<dyn VectorIndex>)> = vec![
        ("linear scan", Box::new(LinearScanIndex::new())),
        ("best-bin-first", Box::new(BestBinFirstIndex::new())),
        ("ball tree", Box::new(BallTreeIndex::new())),
        ("lsh", Box::new(LshIndex::new())),
    ];

    for (name, index) in &mut strategies {
        index.build(records.clone())?;
        let hits = index.query(&query, 3)?;
        let ids: Vec<&str> = hits.iter().map(|r| r.id()).collect();
        println!("{name:>15}: {ids:?}");
    }

    // The linear index also takes live inserts.
    let live = LinearScanIndex::new();
    live.build(records)?;
    live.insert(Arc::new(FeatureRecord::new(
        "sneaker-03.jpg",
        normalized_copy(&[0.87, 0.12, 0.02, 0.08])?,
    )?))?;
    let hits = live.query(&query, 1)?;
    println!("after insert, best match: {}", hits[0].id());

    Ok(())
}
