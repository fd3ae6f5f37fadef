//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::ml::forest::TrainMatrix;

/// Result of partitioning a feature matrix.
#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub train: TrainMatrix,
    pub test: TrainMatrix,
    /// Original row indices of the training rows, ascending.
    pub train_rows: Vec<usize>,
    /// Original row indices of the test rows, ascending.
    pub test_rows: Vec<usize>,
}

/// Partition rows into train and test subsets.
///
/// Shuffles row indices with a seeded RNG and holds out
/// `round(n * test_fraction)` rows, clamped so both sides stay non-empty.
/// Deterministic for a fixed seed; class balance is whatever falls out of
/// the shuffle.
pub fn split_train_test(
    matrix: &TrainMatrix,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitOutput, String> {
    let n = matrix.x.len();
    if n != matrix.y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if n < 2 {
        return Err(format!("Need at least 2 rows to split, got {n}"));
    }
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(format!("Invalid test fraction: {test_fraction}"));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_n = (((n as f64) * test_fraction).round() as usize).clamp(1, n - 1);
    let mut test_rows: Vec<usize> = indices[..test_n].to_vec();
    let mut train_rows: Vec<usize> = indices[test_n..].to_vec();
    test_rows.sort_unstable();
    train_rows.sort_unstable();

    Ok(SplitOutput {
        train: subset(matrix, &train_rows),
        test: subset(matrix, &test_rows),
        train_rows,
        test_rows,
    })
}

fn subset(matrix: &TrainMatrix, rows: &[usize]) -> TrainMatrix {
    TrainMatrix {
        feature_names: matrix.feature_names.clone(),
        classes: matrix.classes.clone(),
        x: rows.iter().map(|&idx| matrix.x[idx].clone()).collect(),
        y: rows.iter().map(|&idx| matrix.y[idx]).collect(),
    }
}
