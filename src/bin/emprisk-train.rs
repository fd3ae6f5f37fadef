//! Trains the employer risk classifier and persists it to disk.

use std::path::{Path, PathBuf};

use emprisk::config::{self, CONFIG_FILE_NAME, TrainingConfig};
use emprisk::logging;
use emprisk::pipeline::run_training;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = load_config(&config_path, &options)?;

    let outcome = run_training(&config)?;
    println!("{}", outcome.report);
    println!(
        "Model trained on {} rows and saved to {}",
        outcome.train_rows,
        outcome.model_path.display()
    );
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    seed: Option<u64>,
    trees: Option<usize>,
}

fn load_config(config_path: &Path, options: &CliOptions) -> Result<TrainingConfig, String> {
    let mut config = config::load_or_default(config_path).map_err(|err| err.to_string())?;
    if let Some(input_path) = &options.input_path {
        config.input_path = input_path.clone();
    }
    if let Some(model_path) = &options.model_path {
        config.model_path = model_path.clone();
    }
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if let Some(trees) = options.trees {
        config.forest.trees = trees;
    }
    Ok(config.normalized())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
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
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.model_path = Some(PathBuf::from(value));
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            "--trees" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--trees requires a value".to_string())?;
                options.trees = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --trees value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    Ok(options)
}

fn help_text() -> String {
    [
        "emprisk-train",
        "",
        "Trains a random-forest employer risk classifier from a CSV extract",
        "and saves it as a JSON model artifact.",
        "",
        "Usage:",
        "  emprisk-train [options]",
        "",
        "Options:",
        "  --config <file>  Config file (default: emprisk.toml, optional).",
        "  --input <file>   CSV extract (default: data/employeurs.csv).",
        "  --out <file>     Output model path (default: model_risque.json).",
        "  --seed <n>       Split/forest seed (default: 42).",
        "  --trees <n>      Number of trees (default: 100).",
    ]
    .join("\n")
}
