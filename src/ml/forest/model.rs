use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Node of an arena-encoded decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal split: `feature <= threshold` goes left, else right.
    Split {
        /// Feature index used for the split.
        feature_index: u16,
        /// Threshold in feature units.
        threshold: f32,
        /// Arena index of the left child.
        left: usize,
        /// Arena index of the right child.
        right: usize,
    },
    /// Terminal node carrying the majority class of its training rows.
    Leaf {
        /// Predicted class index.
        class_index: usize,
    },
}

/// One CART tree; the root lives at arena index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Predict the class index for a feature vector.
    pub fn predict(&self, features: &[f32]) -> usize {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { class_index }) => return *class_index,
                Some(TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features
                        .get(*feature_index as usize)
                        .copied()
                        .unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                None => return 0,
            }
        }
    }
}

/// Bagged decision-tree ensemble for binary employer-risk classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskForestModel {
    /// Model format version.
    pub model_version: i64,
    /// Feature column names, in matrix order, expected by the trees.
    pub feature_names: Vec<String>,
    /// Ordered list of class identifiers.
    pub classes: Vec<String>,
    /// Fitted trees; predictions are aggregated by majority vote.
    pub trees: Vec<DecisionTree>,
}

impl RiskForestModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("Model must contain at least 1 tree".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("Tree {tree_idx} has no nodes"));
            }
            for (node_idx, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Leaf { class_index } => {
                        if *class_index >= self.classes.len() {
                            return Err(format!(
                                "Tree {tree_idx} node {node_idx} predicts unknown class {class_index}"
                            ));
                        }
                    }
                    TreeNode::Split {
                        feature_index,
                        left,
                        right,
                        ..
                    } => {
                        if *feature_index as usize >= self.feature_names.len() {
                            return Err(format!(
                                "Tree {tree_idx} node {node_idx} splits on unknown feature {feature_index}"
                            ));
                        }
                        // Children must point forward in the arena so walks terminate.
                        if *left <= node_idx || *right <= node_idx {
                            return Err(format!(
                                "Tree {tree_idx} node {node_idx} has backward child links"
                            ));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(format!(
                                "Tree {tree_idx} node {node_idx} has out-of-range children"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Count votes per class across all trees.
    fn votes(&self, features: &[f32]) -> Vec<u32> {
        let mut counts = vec![0u32; self.classes.len()];
        for tree in &self.trees {
            let class_index = tree.predict(features);
            if class_index < counts.len() {
                counts[class_index] += 1;
            }
        }
        counts
    }

    /// Predict the majority-vote class index; ties resolve to the lower index.
    pub fn predict_class_index(&self, features: &[f32]) -> usize {
        argmax_u32(&self.votes(features))
    }

    /// Predict class probabilities as vote fractions.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        let counts = self.votes(features);
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return vec![0.0; counts.len()];
        }
        counts
            .into_iter()
            .map(|count| count as f32 / total as f32)
            .collect()
    }

    /// Convenience mapping of class names to indices.
    pub fn class_index_map(&self) -> BTreeMap<String, usize> {
        self.classes
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect()
    }

    /// Load and validate a model from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path)
            .map_err(|err| format!("Read model {}: {err}", path.display()))?;
        let model: Self = serde_json::from_slice(&bytes)
            .map_err(|err| format!("Parse model {}: {err}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    /// Write the model as pretty JSON, overwriting any existing file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("Create model directory: {err}"))?;
        }
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|err| format!("Serialize model: {err}"))?;
        std::fs::write(path, bytes).map_err(|err| format!("Write model {}: {err}", path.display()))
    }
}

fn argmax_u32(values: &[u32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = 0u32;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_val {
            best_val = value;
            best_idx = idx;
        }
    }
    best_idx
}
