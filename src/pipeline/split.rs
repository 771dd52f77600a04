//! Stratified train/test split

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Output of [`stratified_split`]: features and labels for both partitions
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
}

/// Row indices of a stratified split, before any frame is materialised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition row indices so every class keeps its share in both halves.
///
/// The test side holds `ceil(n * test_size)` rows, shared out between the
/// classes in proportion to their size (largest remainder first). A class
/// with at least two rows always lands on both sides. Shuffling is driven by
/// `seed`, so the same inputs always give the same split.
pub fn stratified_indices(labels: &[u8], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        anyhow::bail!("test_size must be between 0 and 1 (exclusive), got {}", test_size);
    }
    if labels.len() < 2 {
        anyhow::bail!("Need at least 2 rows to split, got {}", labels.len());
    }

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
    let allocation = allocate_test_rows(&sizes, test_size);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (indices, n_test) in by_class.values_mut().zip(allocation) {
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    if test.is_empty() {
        anyhow::bail!("Stratified split produced an empty test set");
    }

    // Interleave classes again so neither side is sorted by label
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

/// Test rows per class for class sizes `sizes`
fn allocate_test_rows(sizes: &[usize], test_size: f64) -> Vec<usize> {
    let total: usize = sizes.iter().sum();
    let n_test = (total as f64 * test_size).ceil() as usize;

    let shares: Vec<f64> = sizes
        .iter()
        .map(|&n| n as f64 * n_test as f64 / total as f64)
        .collect();
    let mut allocation: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();

    let mut by_remainder: Vec<usize> = (0..sizes.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = shares[a] - shares[a].floor();
        let rb = shares[b] - shares[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
    let assigned: usize = allocation.iter().sum();
    for &class in by_remainder.iter().take(n_test.saturating_sub(assigned)) {
        allocation[class] += 1;
    }

    // A class with two or more rows keeps at least one row on each side
    let bounds: Vec<(usize, usize)> = sizes
        .iter()
        .map(|&n| if n >= 2 { (1, n - 1) } else { (0, 0) })
        .collect();
    for (k, &(lo, hi)) in allocation.iter_mut().zip(&bounds) {
        *k = (*k).clamp(lo, hi);
    }

    // Rebalance against the largest classes so the total stays at `n_test`
    let mut assigned: usize = allocation.iter().sum();
    while assigned > n_test {
        let donor = (0..sizes.len())
            .filter(|&c| allocation[c] > bounds[c].0)
            .max_by_key(|&c| allocation[c]);
        match donor {
            Some(c) => allocation[c] -= 1,
            None => break,
        }
        assigned -= 1;
    }
    while assigned < n_test {
        let receiver = (0..sizes.len())
            .filter(|&c| allocation[c] < bounds[c].1)
            .max_by_key(|&c| bounds[c].1 - allocation[c]);
        match receiver {
            Some(c) => allocation[c] += 1,
            None => break,
        }
        assigned += 1;
    }

    allocation
}

/// Stratified split of a feature frame and its labels
pub fn stratified_split(
    x: &DataFrame,
    y: &[u8],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if x.height() != y.len() {
        anyhow::bail!(
            "Feature rows ({}) and labels ({}) differ in length",
            x.height(),
            y.len()
        );
    }

    let indices = stratified_indices(y, test_size, seed)?;

    Ok(TrainTestSplit {
        x_train: take_rows(x, &indices.train)?,
        x_test: take_rows(x, &indices.test)?,
        y_train: indices.train.iter().map(|&i| y[i]).collect(),
        y_test: indices.test.iter().map(|&i| y[i]).collect(),
    })
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    df.take(&idx).context("Failed to gather split rows")
}

/// Share of positive labels, used to compare class balance across splits
pub fn positive_rate(labels: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    labels.iter().filter(|&&y| y == 1).count() as f64 / labels.len() as f64
}
