//! Feature-matrix assembly.
//!
//! Builds the numeric matrix fed to the trainer: declared headcount, total
//! payroll, then the one-hot indicators. Identifier strings and the raw risk
//! score never enter the matrix; the score only survives as the derived
//! label.

use crate::ml::forest::TrainMatrix;

use super::encoding::OneHotEncoder;
use super::records::{LabeledEmployer, RISK_CLASSES};

/// Numeric feature columns, in matrix order, ahead of the indicators.
pub const NUMERIC_FEATURES: [&str; 2] = ["effectif_declare", "salaire_total"];

/// Build the feature matrix and label vector from cleaned rows.
///
/// Row order is preserved, so matrix row `i` corresponds to `rows[i]` for
/// identifier lookups downstream.
pub fn build_feature_matrix(rows: &[LabeledEmployer]) -> (TrainMatrix, OneHotEncoder) {
    let encoder = OneHotEncoder::fit(rows);

    let mut feature_names: Vec<String> =
        NUMERIC_FEATURES.iter().map(|name| name.to_string()).collect();
    feature_names.extend(encoder.feature_names());

    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    for row in rows {
        let mut features = Vec::with_capacity(feature_names.len());
        features.push(row.effectif_declare);
        features.push(row.salaire_total);
        features.extend(encoder.encode_row(row));
        x.push(features);
        y.push(row.risque);
    }

    let matrix = TrainMatrix {
        feature_names,
        classes: RISK_CLASSES.iter().map(|name| name.to_string()).collect(),
        x,
        y,
    };
    (matrix, encoder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        effectif: f32,
        salaire: f32,
        score: f32,
        secteur: Option<&str>,
        risque: usize,
    ) -> LabeledEmployer {
        LabeledEmployer {
            raison_sociale: "Alpha".to_string(),
            nif: "N1".to_string(),
            nui: "U1".to_string(),
            effectif_declare: effectif,
            salaire_total: salaire,
            score_risque: score,
            secteur_activite: secteur.map(str::to_string),
            localisation: None,
            risque,
        }
    }

    #[test]
    fn matrix_excludes_identifiers_and_raw_score() {
        let rows = vec![
            row(12.0, 3400.0, 0.91, Some("commerce"), 1),
            row(40.0, 900.0, 0.35, Some("industrie"), 0),
        ];
        let (matrix, _encoder) = build_feature_matrix(&rows);
        assert_eq!(
            matrix.feature_names,
            vec!["effectif_declare", "salaire_total", "secteur_activite=industrie"]
        );
        assert!(!matrix.feature_names.iter().any(|name| name == "score_risque"));
        assert_eq!(matrix.x[0], vec![12.0, 3400.0, 0.0]);
        assert_eq!(matrix.x[1], vec![40.0, 900.0, 1.0]);
        assert_eq!(matrix.y, vec![1, 0]);
        assert_eq!(matrix.classes, vec!["faible", "eleve"]);
    }

    #[test]
    fn rows_align_with_input_order() {
        let rows: Vec<LabeledEmployer> = (0..5)
            .map(|idx| row(idx as f32, 10.0 * idx as f32, 0.1, None, idx % 2))
            .collect();
        let (matrix, _encoder) = build_feature_matrix(&rows);
        assert_eq!(matrix.x.len(), 5);
        for (idx, features) in matrix.x.iter().enumerate() {
            assert_eq!(features[0], idx as f32);
            assert_eq!(matrix.y[idx], idx % 2);
        }
    }
}
