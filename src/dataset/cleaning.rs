//! Row hygiene and label derivation.
//!
//! Cleaning runs strictly before labeling: a row missing any of the three
//! required numeric fields never reaches the labeler or any later stage.

use super::records::{EmployerRecord, HIGH_RISK, LOW_RISK, LabeledEmployer};

/// Drop incomplete rows, then derive the binary risk label.
///
/// A row survives only when `score_risque`, `effectif_declare`, and
/// `salaire_total` are all present and finite. Missing categorical values are
/// tolerated; the encoder emits all-zero indicators for them.
pub fn clean_and_label(records: Vec<EmployerRecord>, threshold: f32) -> Vec<LabeledEmployer> {
    records
        .into_iter()
        .filter_map(|record| {
            let score_risque = present(record.score_risque)?;
            let effectif_declare = present(record.effectif_declare)?;
            let salaire_total = present(record.salaire_total)?;
            let risque = if score_risque >= threshold {
                HIGH_RISK
            } else {
                LOW_RISK
            };
            Some(LabeledEmployer {
                raison_sociale: record.raison_sociale,
                nif: record.nif,
                nui: record.nui,
                effectif_declare,
                salaire_total,
                score_risque,
                secteur_activite: normalize(record.secteur_activite),
                localisation: normalize(record.localisation),
                risque,
            })
        })
        .collect()
}

fn present(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite())
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
