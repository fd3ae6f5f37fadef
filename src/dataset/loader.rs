//! CSV loader for the employer registry extract.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::records::EmployerRecord;

/// Columns the pipeline reads. Extra columns in the extract are ignored.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "raison_sociale",
    "nif",
    "nui",
    "effectif_declare",
    "salaire_total",
    "score_risque",
    "secteur_activite",
    "localisation",
];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

/// Load all employer rows from a CSV file.
///
/// The header row must contain every required column; the check runs before
/// deserialization so a schema fault names the missing column instead of
/// surfacing as a field error on the first row.
pub fn load_employers(path: &Path) -> Result<Vec<EmployerRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<EmployerRecord>() {
        records.push(row?);
    }
    Ok(records)
}
