//! End-to-end pipeline tests over a synthetic employer extract.

use std::path::{Path, PathBuf};

use emprisk::config::TrainingConfig;
use emprisk::dataset::cleaning::clean_and_label;
use emprisk::dataset::loader::{DatasetError, load_employers};
use emprisk::dataset::matrix::build_feature_matrix;
use emprisk::dataset::split::split_train_test;
use emprisk::ml::forest::RiskForestModel;
use emprisk::pipeline::run_training;
use tempfile::TempDir;

const HEADER: &str =
    "raison_sociale,nif,nui,effectif_declare,salaire_total,score_risque,secteur_activite,localisation";

/// Ten employers; rows 3 and 8 are missing `salaire_total`, and three of the
/// eight complete rows have a score at or above 0.8.
const EXTRACT: &str = "\
Alpha SARL,N001,U001,12,3400000,0.91,commerce,Douala
Beta SA,N002,U002,40,9800000,0.35,industrie,Yaounde
Gamma GIE,N003,U003,7,,0.88,services,Douala
Delta SARL,N004,U004,23,5100000,0.80,commerce,Garoua
Epsilon SA,N005,U005,15,2600000,0.12,services,Yaounde
Zeta SARL,N006,U006,9,1400000,0.55,commerce,Douala
Eta SA,N007,U007,61,15800000,0.97,industrie,Douala
Theta GIE,N008,U008,4,,0.42,services,Garoua
Iota SARL,N009,U009,33,7200000,0.61,industrie,Yaounde
Kappa SA,N010,U010,18,3900000,0.27,commerce,Yaounde
";

fn write_extract(dir: &Path) -> PathBuf {
    let path = dir.join("employeurs.csv");
    std::fs::write(&path, format!("{HEADER}\n{EXTRACT}")).unwrap();
    path
}

fn test_config(dir: &Path) -> TrainingConfig {
    let mut config = TrainingConfig::default();
    config.input_path = write_extract(dir);
    config.model_path = dir.join("model_risque.json");
    config.forest.trees = 15;
    config
}

#[test]
fn cleaning_drops_incomplete_rows_and_labels_the_rest() {
    let dir = TempDir::new().unwrap();
    let records = load_employers(&write_extract(dir.path())).unwrap();
    assert_eq!(records.len(), 10);

    let labeled = clean_and_label(records, 0.8);
    assert_eq!(labeled.len(), 8);
    assert!(labeled.iter().all(|row| row.nif != "N003" && row.nif != "N008"));

    let high: Vec<&str> = labeled
        .iter()
        .filter(|row| row.risque == 1)
        .map(|row| row.nif.as_str())
        .collect();
    assert_eq!(high, vec!["N001", "N004", "N007"]);
    assert_eq!(labeled.iter().filter(|row| row.risque == 0).count(), 5);
}

#[test]
fn training_run_splits_saves_and_reports() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());

    let outcome = run_training(&config).unwrap();
    assert_eq!(outcome.rows_loaded, 10);
    assert_eq!(outcome.rows_kept, 8);
    assert_eq!(outcome.train_rows, 6);
    assert_eq!(outcome.test_rows, 2);
    assert!(outcome.report.contains("faible"));
    assert!(outcome.report.contains("eleve"));
    assert!(outcome.report.contains("accuracy"));
    assert!(config.model_path.is_file());
}

#[test]
fn persisted_model_reloads_and_predicts() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    run_training(&config).unwrap();

    let model = RiskForestModel::load_json(&config.model_path).unwrap();
    model.validate().unwrap();
    assert_eq!(model.classes, vec!["faible", "eleve"]);
    assert_eq!(model.trees.len(), 15);
    assert_eq!(model.feature_names[0], "effectif_declare");
    assert_eq!(model.feature_names[1], "salaire_total");

    // The two held-out rows must score without error against the reloaded model.
    let records = load_employers(&config.input_path).unwrap();
    let labeled = clean_and_label(records, config.risk_threshold);
    let (matrix, _encoder) = build_feature_matrix(&labeled);
    assert_eq!(matrix.feature_names, model.feature_names);
    let split = split_train_test(&matrix, config.test_fraction, config.seed).unwrap();
    assert_eq!(split.test.x.len(), 2);
    for row in &split.test.x {
        let proba = model.predict_proba(row);
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(model.predict_class_index(row) < 2);
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());

    run_training(&config).unwrap();
    let first = std::fs::read_to_string(&config.model_path).unwrap();

    config.model_path = dir.path().join("model_risque_rerun.json");
    let outcome = run_training(&config).unwrap();
    let second = std::fs::read_to_string(&config.model_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(outcome.train_rows, 6);
    assert_eq!(outcome.test_rows, 2);
}

#[test]
fn rerun_overwrites_the_existing_artifact() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.model_path, "not a model").unwrap();

    run_training(&config).unwrap();
    let model = RiskForestModel::load_json(&config.model_path).unwrap();
    model.validate().unwrap();
}

#[test]
fn missing_input_file_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.input_path = dir.path().join("absent.csv");

    let err = run_training(&config).unwrap_err();
    assert!(err.contains("absent.csv"));
    assert!(!config.model_path.exists());
}

#[test]
fn missing_column_names_the_schema_fault() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(
        &path,
        "raison_sociale,nif,nui,effectif_declare,salaire_total,secteur_activite,localisation\n",
    )
    .unwrap();

    match load_employers(&path) {
        Err(DatasetError::MissingColumn(column)) => assert_eq!(column, "score_risque"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn unwritable_model_path_fails_after_training() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    // A directory at the model path makes the final write fail.
    config.model_path = dir.path().join("model_as_dir");
    std::fs::create_dir(&config.model_path).unwrap();

    let err = run_training(&config).unwrap_err();
    assert!(err.contains("model_as_dir"));
}
