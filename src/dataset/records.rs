//! Row types for the employer registry extract.

use serde::Deserialize;

/// Class names in label order: index 0 is low risk, index 1 is high risk.
pub const RISK_CLASSES: [&str; 2] = ["faible", "eleve"];

/// Label index for high-risk employers.
pub const HIGH_RISK: usize = 1;
/// Label index for low-risk employers.
pub const LOW_RISK: usize = 0;

/// One employer row as read from the CSV extract.
///
/// Numeric and categorical fields are optional because the extract carries
/// empty cells; the cleaning stage decides which absences are fatal for a
/// row.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployerRecord {
    /// Legal name.
    pub raison_sociale: String,
    /// Tax identification number.
    pub nif: String,
    /// National registration identifier.
    pub nui: String,
    /// Declared headcount.
    pub effectif_declare: Option<f32>,
    /// Total declared payroll.
    pub salaire_total: Option<f32>,
    /// Continuous risk score in `[0, 1]`.
    pub score_risque: Option<f32>,
    /// Activity sector.
    pub secteur_activite: Option<String>,
    /// Location.
    pub localisation: Option<String>,
}

/// An employer row that survived cleaning, with the derived label attached.
#[derive(Debug, Clone)]
pub struct LabeledEmployer {
    pub raison_sociale: String,
    pub nif: String,
    pub nui: String,
    pub effectif_declare: f32,
    pub salaire_total: f32,
    pub score_risque: f32,
    /// Normalized sector: trimmed, never whitespace-only.
    pub secteur_activite: Option<String>,
    /// Normalized location: trimmed, never whitespace-only.
    pub localisation: Option<String>,
    /// Derived label: [`HIGH_RISK`] when the score meets the threshold.
    pub risque: usize,
}
