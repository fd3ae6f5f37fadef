//! Random-forest classifier over tabular feature rows.
//!
//! A deliberately dependency-light ensemble: bagged CART trees grown on Gini
//! impurity with per-node feature subsampling, majority-vote prediction, and
//! reproducible JSON model export/load.

mod model;
mod train;

pub use model::{DecisionTree, RiskForestModel, TreeNode};
pub use train::{TrainMatrix, TrainOptions, train_random_forest};
