//! Evaluation metrics for the sentiment classifier.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

    /// Build from paired truth/prediction labels; out-of-range labels are skipped.
    pub fn from_labels(n_classes: usize, truth: &[u8], predicted: &[u8]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.add(t as usize, p as usize);
        }
        cm
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

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| v as u64).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    pub f1: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Hold-out evaluation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f32,
    pub per_class: Vec<PerClassStats>,
    pub confusion: ConfusionMatrix,
}

impl Evaluation {
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        Self {
            accuracy: accuracy(&confusion),
            per_class: precision_recall_by_class(&confusion),
            confusion,
        }
    }

    /// Human-readable summary, one line per row.
    pub fn report_lines(&self, class_names: &[&str]) -> Vec<String> {
        let mut lines = vec![format!("accuracy: {:.4}", self.accuracy)];
        for (idx, stats) in self.per_class.iter().enumerate() {
            let name = class_names.get(idx).copied().unwrap_or("?");
            lines.push(format!(
                "class {idx} {name:<10} precision={:.3}  recall={:.3}  f1={:.3}  support={}",
                stats.precision, stats.recall, stats.f1, stats.support
            ));
        }
        lines.push("confusion matrix (rows=true, cols=pred):".to_string());
        for truth in 0..self.confusion.n_classes {
            let mut row = String::new();
            for pred in 0..self.confusion.n_classes {
                row.push_str(&format!("{:8}", self.confusion.get(truth, pred)));
            }
            lines.push(row);
        }
        lines
    }
}

/// Compute per-class precision, recall and F1 from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
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
        stats.push(PerClassStats {
            precision,
            recall,
            f1: f1_score(precision, recall),
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f32 {
    let total = cm.total();
    if total == 0 {
        return 0.0;
    }
    let correct: u64 = (0..cm.n_classes).map(|c| cm.get(c, c) as u64).sum();
    (correct as f32) / (total as f32)
}

pub fn f1_score(precision: f32, recall: f32) -> f32 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_counts_and_scores() {
        let truth = [1, 1, 1, 0, 0, 0, 0, 1];
        let predicted = [1, 1, 0, 0, 0, 1, 0, 1];
        let eval = Evaluation::from_confusion(ConfusionMatrix::from_labels(2, &truth, &predicted));
        assert_eq!(eval.confusion.get(1, 1), 3);
        assert_eq!(eval.confusion.get(1, 0), 1);
        assert_eq!(eval.confusion.get(0, 1), 1);
        assert_eq!(eval.confusion.get(0, 0), 3);
        assert!((eval.accuracy - 0.75).abs() < 1e-6);
        let positive = &eval.per_class[1];
        assert!((positive.precision - 0.75).abs() < 1e-6);
        assert!((positive.recall - 0.75).abs() < 1e-6);
        assert!((positive.f1 - 0.75).abs() < 1e-6);
        assert_eq!(positive.support, 4);
    }

    #[test]
    fn report_lists_classes_and_matrix() {
        let eval = Evaluation::from_confusion(ConfusionMatrix::from_labels(2, &[0, 1], &[0, 0]));
        let lines = eval.report_lines(&["negative", "positive"]);
        assert_eq!(lines[0], "accuracy: 0.5000");
        assert!(lines[1].contains("negative"));
        assert!(lines[2].contains("support=1"));
        assert_eq!(lines[4], "       1       0");
        assert_eq!(lines[5], "       1       0");
    }

    #[test]
    fn empty_matrix_scores_zero() {
        let cm = ConfusionMatrix::new(2);
        assert_eq!(accuracy(&cm), 0.0);
        assert!(precision_recall_by_class(&cm).iter().all(|s| s.f1 == 0.0));
    }
}
