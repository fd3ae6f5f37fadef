//! End-to-end training pipeline.
//!
//! Wires the stages in a fixed order: load, clean + label, encode, split,
//! train, evaluate, persist. Each stage's output feeds the next; any failure
//! aborts the run with the stage's error.

use std::path::PathBuf;

use crate::config::TrainingConfig;
use crate::dataset::cleaning::clean_and_label;
use crate::dataset::loader::load_employers;
use crate::dataset::matrix::build_feature_matrix;
use crate::dataset::split::split_train_test;
use crate::ml::forest::{RiskForestModel, TrainMatrix, TrainOptions, train_random_forest};
use crate::ml::metrics::{ConfusionMatrix, PerClassStats, accuracy, classification_report,
    per_class_stats};

/// Result of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Rows read from the CSV extract.
    pub rows_loaded: usize,
    /// Rows surviving the cleaning stage.
    pub rows_kept: usize,
    /// Training rows after the split.
    pub train_rows: usize,
    /// Held-out rows after the split.
    pub test_rows: usize,
    /// Held-out accuracy.
    pub accuracy: f32,
    /// Per-class precision/recall/F1 on the held-out rows.
    pub per_class: Vec<PerClassStats>,
    /// Rendered classification report.
    pub report: String,
    /// Where the model artifact was written.
    pub model_path: PathBuf,
}

/// Run the full pipeline and persist the fitted model.
pub fn run_training(config: &TrainingConfig) -> Result<TrainingOutcome, String> {
    let records = load_employers(&config.input_path).map_err(|err| err.to_string())?;
    let rows_loaded = records.len();
    tracing::info!(
        "Loaded {rows_loaded} employer records from {}",
        config.input_path.display()
    );

    let labeled = clean_and_label(records, config.risk_threshold);
    let rows_kept = labeled.len();
    if rows_kept == 0 {
        return Err("No usable rows after cleaning".to_string());
    }
    let high_risk = labeled.iter().filter(|row| row.risque == 1).count();
    tracing::info!(
        "Kept {rows_kept} rows after cleaning ({} dropped); {high_risk} labeled high risk",
        rows_loaded - rows_kept
    );

    let (matrix, _encoder) = build_feature_matrix(&labeled);
    tracing::info!("Feature matrix: {} columns", matrix.feature_names.len());

    let split = split_train_test(&matrix, config.test_fraction, config.seed)?;
    tracing::info!(
        "Split {} train / {} test rows (seed {})",
        split.train.x.len(),
        split.test.x.len(),
        config.seed
    );

    let options = TrainOptions {
        trees: config.forest.trees,
        max_depth: config.forest.max_depth,
        min_leaf: config.forest.min_leaf,
        seed: config.seed,
    };
    let model = train_random_forest(&split.train, &options)?;
    tracing::info!("Trained {} trees", model.trees.len());

    let cm = evaluate_model(&model, &split.test);
    let outcome = TrainingOutcome {
        rows_loaded,
        rows_kept,
        train_rows: split.train.x.len(),
        test_rows: split.test.x.len(),
        accuracy: accuracy(&cm),
        per_class: per_class_stats(&cm),
        report: classification_report(&cm, &model.classes),
        model_path: config.model_path.clone(),
    };

    model.save_json(&config.model_path)?;
    tracing::info!("Saved model to {}", config.model_path.display());

    Ok(outcome)
}

/// Score a model against a matrix and collect the confusion matrix.
pub fn evaluate_model(model: &RiskForestModel, dataset: &TrainMatrix) -> ConfusionMatrix {
    let mut cm = ConfusionMatrix::new(model.classes.len());
    for (row, &truth) in dataset.x.iter().zip(dataset.y.iter()) {
        let predicted = model.predict_class_index(row);
        cm.add(truth, predicted);
    }
    cm
}
