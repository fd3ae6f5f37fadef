//! Evaluation metrics for classification models.

use std::fmt::Write as _;

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    /// Total number of scored rows.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Harmonic mean of precision and recall.
    pub f1: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision, recall, and F1 from a confusion matrix.
pub fn per_class_stats(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f32;
        let mut fp = 0f32;
        let mut fn_ = 0f32;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f32;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f32;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        stats.push(PerClassStats {
            precision,
            recall,
            f1,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f32 {
    let mut correct = 0u64;
    let mut total = 0u64;
    for truth in 0..cm.n_classes {
        for predicted in 0..cm.n_classes {
            let v = cm.get(truth, predicted) as u64;
            total += v;
            if truth == predicted {
                correct += v;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        (correct as f32) / (total as f32)
    }
}

/// Render a text classification report: one row per class with
/// precision/recall/F1/support, then accuracy and macro averages.
pub fn classification_report(cm: &ConfusionMatrix, classes: &[String]) -> String {
    let stats = per_class_stats(cm);
    let total = cm.total();
    let name_width = classes
        .iter()
        .map(|name| name.len())
        .max()
        .unwrap_or(0)
        .max("macro avg".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9}  {:>9}  {:>9}  {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    out.push('\n');
    for (name, class_stats) in classes.iter().zip(&stats) {
        let _ = writeln!(
            out,
            "{:>name_width$}  {:>9.3}  {:>9.3}  {:>9.3}  {:>9}",
            name,
            class_stats.precision,
            class_stats.recall,
            class_stats.f1,
            class_stats.support
        );
    }
    out.push('\n');
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9}  {:>9}  {:>9.3}  {:>9}",
        "accuracy",
        "",
        "",
        accuracy(cm),
        total
    );
    let k = stats.len().max(1) as f32;
    let _ = writeln!(
        out,
        "{:>name_width$}  {:>9.3}  {:>9.3}  {:>9.3}  {:>9}",
        "macro avg",
        stats.iter().map(|s| s.precision).sum::<f32>() / k,
        stats.iter().map(|s| s.recall).sum::<f32>() / k,
        stats.iter().map(|s| s.f1).sum::<f32>() / k,
        total
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::new(2);
        // truth=faible: 48 right, 2 wrong; truth=eleve: 8 right, 4 wrong.
        for _ in 0..48 {
            cm.add(0, 0);
        }
        for _ in 0..2 {
            cm.add(0, 1);
        }
        for _ in 0..8 {
            cm.add(1, 1);
        }
        for _ in 0..4 {
            cm.add(1, 0);
        }
        cm
    }

    #[test]
    fn per_class_precision_recall_f1() {
        let stats = per_class_stats(&sample_matrix());
        let faible = &stats[0];
        assert!((faible.precision - 48.0 / 52.0).abs() < 1e-6);
        assert!((faible.recall - 48.0 / 50.0).abs() < 1e-6);
        assert_eq!(faible.support, 50);

        let eleve = &stats[1];
        assert!((eleve.precision - 0.8).abs() < 1e-6);
        assert!((eleve.recall - 8.0 / 12.0).abs() < 1e-6);
        let expected_f1 = 2.0 * 0.8 * (8.0 / 12.0) / (0.8 + 8.0 / 12.0);
        assert!((eleve.f1 - expected_f1).abs() < 1e-6);
        assert_eq!(eleve.support, 12);
    }

    #[test]
    fn accuracy_counts_the_diagonal() {
        let acc = accuracy(&sample_matrix());
        assert!((acc - 56.0 / 62.0).abs() < 1e-6);
    }

    #[test]
    fn empty_matrix_has_zero_accuracy() {
        assert_eq!(accuracy(&ConfusionMatrix::new(2)), 0.0);
    }

    #[test]
    fn out_of_range_additions_are_ignored() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(5, 0);
        cm.add(0, 5);
        assert_eq!(cm.total(), 0);
    }

    #[test]
    fn report_lists_every_class_and_summary_rows() {
        let classes = vec!["faible".to_string(), "eleve".to_string()];
        let report = classification_report(&sample_matrix(), &classes);
        assert!(report.contains("faible"));
        assert!(report.contains("eleve"));
        assert!(report.contains("accuracy"));
        assert!(report.contains("macro avg"));
        assert!(report.contains("support"));
        assert!(report.contains("62"));
    }
}
