//! Evaluation metrics for binary classifiers.

use std::fmt;

use serde::Serialize;

/// Confusion matrix for a `K`-class classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
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

    /// Tally a binary prediction run
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut cm = Self::new(2);
        for (&truth, &predicted) in y_true.iter().zip(y_pred.iter()) {
            cm.add(truth as usize, predicted as usize);
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

    /// Rows as nested vectors, truth-major
    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.counts
            .chunks(self.n_classes.max(1))
            .map(<[u32]>::to_vec)
            .collect()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let cells: Vec<String> = row.iter().map(|c| format!("{:>5}", c)).collect();
            writeln!(f, "[{} ]", cells.join(""))?;
        }
        Ok(())
    }
}

/// Precision/recall/F1 for a single class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    pub f1: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Per-class precision/recall table with accuracy and averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<ClassMetrics> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f64;
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f64;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f64;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(ClassMetrics {
            label: class_idx.to_string(),
            precision,
            recall,
            f1: harmonic_mean(precision, recall),
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let total: u64 = cm.counts.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }
    let correct: u64 = (0..cm.n_classes).map(|i| cm.get(i, i) as u64).sum();
    correct as f64 / total as f64
}

pub fn accuracy_score(y_true: &[u8], y_pred: &[u8]) -> f64 {
    accuracy(&ConfusionMatrix::from_predictions(y_true, y_pred))
}

/// F1 of the positive class (label 1)
pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let cm = ConfusionMatrix::from_predictions(y_true, y_pred);
    precision_recall_by_class(&cm)[1].f1
}

/// Area under the ROC curve from positive-class scores.
///
/// Uses the rank-sum formulation with tied scores sharing their average
/// rank. Returns `None` when only one class is present.
pub fn roc_auc_score(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&y| y == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut pos_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j+1 share their mean
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if y_true[idx] == 1 {
                pos_rank_sum += avg_rank;
            }
        }
        i = j + 1;
    }

    let n_pos_f = n_pos as f64;
    Some((pos_rank_sum - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64))
}

/// Mean binary cross-entropy, with probabilities clipped away from 0 and 1
pub fn log_loss(y_true: &[u8], probs: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let eps = 1e-15;
    let total: f64 = y_true
        .iter()
        .zip(probs.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            if y == 1 {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / y_true.len() as f64
}

pub fn classification_report(y_true: &[u8], y_pred: &[u8]) -> ClassificationReport {
    let cm = ConfusionMatrix::from_predictions(y_true, y_pred);
    let classes = precision_recall_by_class(&cm);

    let k = classes.len() as f64;
    let total: f64 = classes.iter().map(|c| c.support as f64).sum();
    let average = |label: &str, weight: &dyn Fn(&ClassMetrics) -> f64, norm: f64| ClassMetrics {
        label: label.to_string(),
        precision: classes.iter().map(|c| c.precision * weight(c)).sum::<f64>() / norm,
        recall: classes.iter().map(|c| c.recall * weight(c)).sum::<f64>() / norm,
        f1: classes.iter().map(|c| c.f1 * weight(c)).sum::<f64>() / norm,
        support: total as u32,
    };

    let macro_avg = average("macro avg", &|_| 1.0, k.max(1.0));
    let weighted_avg = average("weighted avg", &|c| c.support as f64, total.max(1.0));

    ClassificationReport {
        accuracy: accuracy(&cm),
        classes,
        macro_avg,
        weighted_avg,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        )?;
        for c in [&self.macro_avg, &self.weighted_avg] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        Ok(())
    }
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        0.0
    } else {
        2.0 * a * b / (a + b)
    }
}
