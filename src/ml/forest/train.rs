use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::model::{DecisionTree, RiskForestModel, TreeNode};

/// Training hyperparameters for the forest.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Maximum depth of any tree.
    pub max_depth: usize,
    /// Minimum number of samples in a leaf.
    pub min_leaf: usize,
    /// Seed for bootstrap and feature subsampling.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 16,
            min_leaf: 1,
            seed: 42,
        }
    }
}

/// In-memory dataset used for training and evaluation.
#[derive(Debug, Clone)]
pub struct TrainMatrix {
    /// Feature column names, matching every row's width.
    pub feature_names: Vec<String>,
    /// Ordered list of class identifiers.
    pub classes: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f32>>,
    /// Class indices aligned with `x`.
    pub y: Vec<usize>,
}

/// Train a bagged ensemble of Gini-grown CART trees.
///
/// Each tree sees a bootstrap resample of the rows and considers
/// `floor(sqrt(d))` candidate features per split. Fully deterministic for a
/// fixed seed.
pub fn train_random_forest(
    dataset: &TrainMatrix,
    options: &TrainOptions,
) -> Result<RiskForestModel, String> {
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if dataset.x.is_empty() {
        return Err("Empty dataset".to_string());
    }
    let n_classes = dataset.classes.len();
    if n_classes < 2 {
        return Err("Need at least 2 classes".to_string());
    }
    let n_features = dataset.feature_names.len();
    if n_features == 0 {
        return Err("Empty feature list".to_string());
    }
    if n_features > u16::MAX as usize {
        return Err("Too many features".to_string());
    }
    if let Some(row) = dataset.x.iter().find(|row| row.len() != n_features) {
        return Err(format!(
            "Row width {} does not match {} feature names",
            row.len(),
            n_features
        ));
    }
    if dataset.y.iter().any(|&label| label >= n_classes) {
        return Err("Label out of class range".to_string());
    }
    if options.trees == 0 {
        return Err("Need at least 1 tree".to_string());
    }

    let n = dataset.x.len();
    let mut trees = Vec::with_capacity(options.trees);
    for tree_idx in 0..options.trees {
        let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(tree_idx as u64));
        let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
        let mut nodes = Vec::new();
        build_node(dataset, &sample, 0, options, &mut rng, &mut nodes);
        trees.push(DecisionTree { nodes });
    }

    Ok(RiskForestModel {
        model_version: 1,
        feature_names: dataset.feature_names.clone(),
        classes: dataset.classes.clone(),
        trees,
    })
}

/// Grow one subtree over `indices`, returning its arena index.
fn build_node(
    dataset: &TrainMatrix,
    indices: &[usize],
    depth: usize,
    options: &TrainOptions,
    rng: &mut StdRng,
    nodes: &mut Vec<TreeNode>,
) -> usize {
    let n_classes = dataset.classes.len();
    let counts = class_counts(&dataset.y, indices, n_classes);
    let majority = argmax_count(&counts);

    let node_idx = nodes.len();
    let pure = counts.iter().filter(|&&count| count > 0).count() <= 1;
    if depth >= options.max_depth || pure || indices.len() < options.min_leaf.max(1) * 2 {
        nodes.push(TreeNode::Leaf {
            class_index: majority,
        });
        return node_idx;
    }

    let Some(split) = best_split(dataset, indices, options.min_leaf.max(1), rng) else {
        nodes.push(TreeNode::Leaf {
            class_index: majority,
        });
        return node_idx;
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&row| dataset.x[row][split.feature_index] <= split.threshold);

    // Reserve the slot so child indices always point forward in the arena.
    nodes.push(TreeNode::Leaf {
        class_index: majority,
    });
    let left = build_node(dataset, &left_rows, depth + 1, options, rng, nodes);
    let right = build_node(dataset, &right_rows, depth + 1, options, rng, nodes);
    nodes[node_idx] = TreeNode::Split {
        feature_index: split.feature_index as u16,
        threshold: split.threshold,
        left,
        right,
    };
    node_idx
}

#[derive(Debug, Clone)]
struct BestSplit {
    score: f64,
    feature_index: usize,
    threshold: f32,
}

/// Search the sampled feature subset for the lowest weighted Gini impurity.
fn best_split(
    dataset: &TrainMatrix,
    indices: &[usize],
    min_leaf: usize,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    let n_features = dataset.feature_names.len();
    let n_classes = dataset.classes.len();
    let subset = (n_features as f64).sqrt().floor().max(1.0) as usize;
    let mut candidates: Vec<usize> = (0..n_features).collect();
    candidates.shuffle(rng);
    candidates.truncate(subset);

    let mut best: Option<BestSplit> = None;
    for feature_index in candidates {
        let mut values: Vec<(f32, usize)> = indices
            .iter()
            .map(|&row| (dataset.x[row][feature_index], dataset.y[row]))
            .collect();
        values.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        let total = values.len();
        if values[0].0 == values[total - 1].0 {
            continue;
        }

        let total_counts = class_counts_pairs(&values, n_classes);
        let mut left_counts = vec![0usize; n_classes];
        for position in 0..total - 1 {
            left_counts[values[position].1] += 1;
            if values[position].0 == values[position + 1].0 {
                continue;
            }
            let left_n = position + 1;
            let right_n = total - left_n;
            if left_n < min_leaf || right_n < min_leaf {
                continue;
            }
            let right_counts: Vec<usize> = total_counts
                .iter()
                .zip(&left_counts)
                .map(|(&all, &left)| all - left)
                .collect();
            let score = (left_n as f64 * gini(&left_counts, left_n)
                + right_n as f64 * gini(&right_counts, right_n))
                / total as f64;
            if best.as_ref().is_none_or(|current| score < current.score) {
                best = Some(BestSplit {
                    score,
                    feature_index,
                    threshold: midpoint(values[position].0, values[position + 1].0),
                });
            }
        }
    }
    best
}

fn midpoint(low: f32, high: f32) -> f32 {
    let mid = low + (high - low) / 2.0;
    // Guard against rounding collapsing the midpoint onto the upper value,
    // which would send both sides of the split the same way.
    if mid >= high { low } else { mid }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let mut sum_sq = 0.0f64;
    for &count in counts {
        let p = count as f64 / total as f64;
        sum_sq += p * p;
    }
    1.0 - sum_sq
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &row in indices {
        if y[row] < n_classes {
            counts[y[row]] += 1;
        }
    }
    counts
}

fn class_counts_pairs(values: &[(f32, usize)], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &(_, class_index) in values {
        if class_index < n_classes {
            counts[class_index] += 1;
        }
    }
    counts
}

fn argmax_count(counts: &[usize]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = 0usize;
    for (idx, &count) in counts.iter().enumerate() {
        if count > best_val {
            best_val = count;
            best_idx = idx;
        }
    }
    best_idx
}
