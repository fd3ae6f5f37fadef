//! Training configuration.
//!
//! Every tunable the pipeline uses (input/output paths, label threshold,
//! split fraction, seed, forest size) lives here instead of being a literal
//! in the binaries. A missing file or an empty table yields the defaults, so
//! running the trainer without any configuration reproduces the reference
//! behavior.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default filename looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "emprisk.toml";

/// Errors that may occur while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize the configuration.
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    /// Failed to write the configuration file.
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Pipeline settings loaded from `emprisk.toml`.
///
/// Config keys (TOML): `input_path`, `model_path`, `risk_threshold`,
/// `test_fraction`, `seed`, `forest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// CSV file with one employer record per row.
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    /// Output path for the serialized model artifact.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Risk-score cutoff above which a row is labeled high risk.
    #[serde(default = "default_risk_threshold")]
    pub risk_threshold: f32,
    /// Fraction of cleaned rows held out for evaluation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed controlling the train/test partition and forest sampling.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub forest: ForestSettings,
}

/// Forest hyperparameters.
///
/// Config keys: `trees`, `max_depth`, `min_leaf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSettings {
    /// Number of trees in the ensemble.
    #[serde(default = "default_trees")]
    pub trees: usize,
    /// Maximum depth of any tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum number of samples in a leaf.
    #[serde(default = "default_min_leaf")]
    pub min_leaf: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            model_path: default_model_path(),
            risk_threshold: default_risk_threshold(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            forest: ForestSettings::default(),
        }
    }
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            max_depth: default_max_depth(),
            min_leaf: default_min_leaf(),
        }
    }
}

impl TrainingConfig {
    /// Clamp out-of-range values instead of rejecting the file.
    pub fn normalized(mut self) -> Self {
        self.risk_threshold = self.risk_threshold.clamp(0.0, 1.0);
        self.test_fraction = self.test_fraction.clamp(MIN_TEST_FRACTION, MAX_TEST_FRACTION);
        self.forest.trees = self.forest.trees.max(1);
        self.forest.max_depth = self.forest.max_depth.max(1);
        self.forest.min_leaf = self.forest.min_leaf.max(1);
        self
    }
}

const MIN_TEST_FRACTION: f64 = 0.01;
const MAX_TEST_FRACTION: f64 = 0.99;

/// Load the configuration from `path`, falling back to defaults when the
/// file does not exist.
pub fn load_or_default(path: &Path) -> Result<TrainingConfig, ConfigError> {
    if !path.is_file() {
        return Ok(TrainingConfig::default());
    }
    load_from_path(path)
}

/// Load and normalize the configuration from an existing file.
pub fn load_from_path(path: &Path) -> Result<TrainingConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: TrainingConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config.normalized())
}

/// Write the configuration as TOML, creating parent directories as needed.
pub fn save_to_path(config: &TrainingConfig, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data/employeurs.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model_risque.json")
}

fn default_risk_threshold() -> f32 {
    0.8
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    16
}

fn default_min_leaf() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.input_path, PathBuf::from("data/employeurs.csv"));
        assert_eq!(config.model_path, PathBuf::from("model_risque.json"));
        assert_eq!(config.risk_threshold, 0.8);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.forest.trees, 100);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "risk_threshold = 0.9\n\n[forest]\ntrees = 10\n").unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.risk_threshold, 0.9);
        assert_eq!(config.forest.trees, 10);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.forest.max_depth, 16);
    }

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let config = TrainingConfig {
            risk_threshold: 1.7,
            test_fraction: 0.0,
            forest: ForestSettings {
                trees: 0,
                max_depth: 0,
                min_leaf: 0,
            },
            ..TrainingConfig::default()
        }
        .normalized();
        assert_eq!(config.risk_threshold, 1.0);
        assert_eq!(config.test_fraction, MIN_TEST_FRACTION);
        assert_eq!(config.forest.trees, 1);
        assert_eq!(config.forest.max_depth, 1);
        assert_eq!(config.forest.min_leaf, 1);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut config = TrainingConfig::default();
        config.seed = 7;
        config.input_path = PathBuf::from("extract.csv");
        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.seed, 7);
        assert_eq!(loaded.input_path, PathBuf::from("extract.csv"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "risk_threshold = [not toml").unwrap();
        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
