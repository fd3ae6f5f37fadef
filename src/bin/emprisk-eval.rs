//! Evaluates a persisted risk model against a CSV extract.

use std::path::PathBuf;

use emprisk::config::{self, CONFIG_FILE_NAME};
use emprisk::dataset::cleaning::clean_and_label;
use emprisk::dataset::loader::load_employers;
use emprisk::dataset::matrix::build_feature_matrix;
use emprisk::dataset::split::split_train_test;
use emprisk::ml::forest::RiskForestModel;
use emprisk::ml::metrics::{ConfusionMatrix, accuracy, per_class_stats};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    model_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
    split: String,
    top: usize,
}

#[derive(Debug, Clone)]
struct MisclassifiedEmployer {
    raison_sociale: String,
    nif: String,
    truth: String,
    predicted: String,
    confidence: f32,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let mut config = config::load_or_default(&config_path).map_err(|err| err.to_string())?;
    if let Some(input_path) = &options.input_path {
        config.input_path = input_path.clone();
    }
    let config = config.normalized();
    let model_path = options
        .model_path
        .clone()
        .unwrap_or_else(|| config.model_path.clone());

    let model = RiskForestModel::load_json(&model_path)?;
    let records = load_employers(&config.input_path).map_err(|err| err.to_string())?;
    let labeled = clean_and_label(records, config.risk_threshold);
    if labeled.is_empty() {
        return Err("No usable rows after cleaning".to_string());
    }
    let (matrix, _encoder) = build_feature_matrix(&labeled);
    if matrix.feature_names != model.feature_names {
        return Err(format!(
            "Feature columns changed since training: extract has {}, model expects {}",
            matrix.feature_names.join(", "),
            model.feature_names.join(", ")
        ));
    }

    // Re-derive the seeded partition so "test" means the rows the model never saw.
    let rows: Vec<usize> = match options.split.as_str() {
        "all" => (0..matrix.x.len()).collect(),
        "train" => split_train_test(&matrix, config.test_fraction, config.seed)?.train_rows,
        "test" => split_train_test(&matrix, config.test_fraction, config.seed)?.test_rows,
        other => return Err(format!("Invalid --split value: {other}")),
    };

    let mut cm = ConfusionMatrix::new(model.classes.len());
    let mut misclassified = Vec::new();
    for &row in &rows {
        let truth = matrix.y[row];
        let proba = model.predict_proba(&matrix.x[row]);
        let (predicted, confidence) = argmax(&proba);
        cm.add(truth, predicted);
        if predicted != truth {
            misclassified.push(MisclassifiedEmployer {
                raison_sociale: labeled[row].raison_sociale.clone(),
                nif: labeled[row].nif.clone(),
                truth: model.classes[truth].clone(),
                predicted: model.classes[predicted].clone(),
                confidence,
            });
        }
    }

    println!("accuracy: {:.4}", accuracy(&cm));
    let per_class = per_class_stats(&cm);
    for (idx, stats) in per_class.iter().enumerate() {
        println!(
            "class {:>2} {:<8}  precision={:.3}  recall={:.3}  f1={:.3}  support={}",
            idx, model.classes[idx], stats.precision, stats.recall, stats.f1, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..cm.n_classes {
        let mut row = String::new();
        for pred in 0..cm.n_classes {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }

    if !misclassified.is_empty() {
        println!();
        println!("Top misclassified employers (highest confidence):");
        misclassified.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        for item in misclassified.iter().take(options.top) {
            println!(
                "- {} ({})  truth={}  pred={}  conf={:.3}",
                item.raison_sociale, item.nif, item.truth, item.predicted, item.confidence
            );
        }
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        model_path: None,
        config_path: None,
        input_path: None,
        split: "test".to_string(),
        top: 20,
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                options.model_path = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--input" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--input requires a value".to_string())?;
                options.input_path = Some(PathBuf::from(value));
            }
            "--split" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--split requires a value".to_string())?;
                options.split = value.to_string();
            }
            "--top" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--top requires a value".to_string())?;
                options.top = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --top value: {value}"))?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    Ok(options)
}

fn help_text() -> String {
    [
        "emprisk-eval",
        "",
        "Usage:",
        "  emprisk-eval [--model <model_risque.json>] [options]",
        "",
        "Options:",
        "  --model <file>   Model artifact (default: model path from config).",
        "  --config <file>  Config file (default: emprisk.toml, optional).",
        "  --input <file>   CSV extract (default: input path from config).",
        "  --split <test|train|all>  Rows to score (default: test).",
        "  --top <n>        Top N misclassified employers (default: 20).",
    ]
    .join("\n")
}

fn argmax(values: &[f32]) -> (usize, f32) {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_val {
            best_val = value;
            best_idx = idx;
        }
    }
    (best_idx, best_val)
}
