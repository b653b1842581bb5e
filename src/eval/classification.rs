//! Classification metrics over indicator matrices
//!
//! Provides multi-class metrics computed column-wise on one-hot (or
//! multi-hot) matrices:
//! - Probability binarization at the 0.5 threshold
//! - Per-class precision, recall, F1, and support
//! - Macro and weighted averaging
//! - sklearn-style classification reports
//!
//! Targets and predictions share the rows x classes layout used by the
//! dataset tables, so fold slices and model outputs feed in directly.

use crate::error::{Error, Result};
use ndarray::Array2;
use serde::Serialize;

/// Averaging strategy for multi-class metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Average {
    /// Calculate metrics for each label, return unweighted mean
    Macro,
    /// Weighted mean by support (number of true instances per label)
    Weighted,
}

/// Turn probabilities into 0/1 indicators; 0.5 rounds up.
#[must_use]
pub fn binarize(probabilities: &Array2<f32>) -> Array2<f32> {
    probabilities.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 })
}

/// Per-class precision, recall, F1, and support
#[derive(Clone, Debug, Serialize)]
pub struct ClassMetrics {
    /// Per-class precision
    pub precision: Vec<f64>,
    /// Per-class recall
    pub recall: Vec<f64>,
    /// Per-class F1 score
    pub f1: Vec<f64>,
    /// Per-class support (count of true instances)
    pub support: Vec<usize>,
}

impl ClassMetrics {
    /// Compute metrics column-wise from indicator matrices.
    ///
    /// Any nonzero entry counts as a positive, so both strict one-hot
    /// targets and multi-hot binarized predictions are accepted.
    pub fn from_indicators(targets: &Array2<f32>, predictions: &Array2<f32>) -> Result<Self> {
        if targets.dim() != predictions.dim() {
            return Err(Error::ShapeMismatch(format!(
                "targets are {:?}, predictions are {:?}",
                targets.dim(),
                predictions.dim()
            )));
        }

        let n_classes = targets.ncols();
        let mut precision = Vec::with_capacity(n_classes);
        let mut recall = Vec::with_capacity(n_classes);
        let mut f1 = Vec::with_capacity(n_classes);
        let mut support = Vec::with_capacity(n_classes);

        for class in 0..n_classes {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            for (t, p) in targets
                .column(class)
                .iter()
                .zip(predictions.column(class).iter())
            {
                match (*t != 0.0, *p != 0.0) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }

            let tp_f = tp as f64;
            let fp_f = fp as f64;
            let fn_f = fn_ as f64;

            let p = if tp_f + fp_f > 0.0 {
                tp_f / (tp_f + fp_f)
            } else {
                0.0
            };
            let r = if tp_f + fn_f > 0.0 {
                tp_f / (tp_f + fn_f)
            } else {
                0.0
            };
            let f = if p + r > 0.0 {
                2.0 * p * r / (p + r)
            } else {
                0.0
            };

            precision.push(p);
            recall.push(r);
            f1.push(f);
            support.push(tp + fn_);
        }

        Ok(Self {
            precision,
            recall,
            f1,
            support,
        })
    }

    /// Number of classes covered
    pub fn num_classes(&self) -> usize {
        self.support.len()
    }

    /// Total true instances across all classes
    pub fn total_support(&self) -> usize {
        self.support.iter().sum()
    }

    /// Get averaged precision
    pub fn precision_avg(&self, average: Average) -> f64 {
        self.average_metric(&self.precision, average)
    }

    /// Get averaged recall
    pub fn recall_avg(&self, average: Average) -> f64 {
        self.average_metric(&self.recall, average)
    }

    /// Get averaged F1
    pub fn f1_avg(&self, average: Average) -> f64 {
        self.average_metric(&self.f1, average)
    }

    fn average_metric(&self, values: &[f64], average: Average) -> f64 {
        match average {
            Average::Macro => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Average::Weighted => {
                let total_support = self.total_support();
                if total_support == 0 {
                    return 0.0;
                }
                values
                    .iter()
                    .zip(self.support.iter())
                    .map(|(&v, &s)| v * s as f64)
                    .sum::<f64>()
                    / total_support as f64
            }
        }
    }
}

/// Support-weighted F1 across classes, the fold selection score.
pub fn weighted_f1(targets: &Array2<f32>, predictions: &Array2<f32>) -> Result<f64> {
    Ok(ClassMetrics::from_indicators(targets, predictions)?.f1_avg(Average::Weighted))
}

/// Fraction of rows whose indicator pattern matches exactly.
fn exact_match(targets: &Array2<f32>, predictions: &Array2<f32>) -> f64 {
    if targets.nrows() == 0 {
        return 0.0;
    }
    let hits = targets
        .rows()
        .into_iter()
        .zip(predictions.rows())
        .filter(|(t, p)| t.iter().zip(p.iter()).all(|(a, b)| (*a != 0.0) == (*b != 0.0)))
        .count();
    hits as f64 / targets.nrows() as f64
}

/// Generate sklearn-style classification report
///
/// # Arguments
/// * `targets` - One-hot ground truth, rows x classes
/// * `predictions` - Binarized predictions with the same shape
///
/// # Returns
/// A formatted string containing per-class and overall metrics
pub fn classification_report(targets: &Array2<f32>, predictions: &Array2<f32>) -> Result<String> {
    let metrics = ClassMetrics::from_indicators(targets, predictions)?;

    let mut report = String::new();

    // Header
    report.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10} {:>10}\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    report.push_str(&"-".repeat(54));
    report.push('\n');

    // Per-class metrics
    for class in 0..metrics.num_classes() {
        report.push_str(&format!(
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
            format!("Class {class}"),
            metrics.precision[class],
            metrics.recall[class],
            metrics.f1[class],
            metrics.support[class]
        ));
    }

    report.push_str(&"-".repeat(54));
    report.push('\n');

    // Averages
    let total_support = metrics.total_support();

    report.push_str(&format!(
        "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
        "macro avg",
        metrics.precision_avg(Average::Macro),
        metrics.recall_avg(Average::Macro),
        metrics.f1_avg(Average::Macro),
        total_support
    ));

    report.push_str(&format!(
        "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
        "weighted avg",
        metrics.precision_avg(Average::Weighted),
        metrics.recall_avg(Average::Weighted),
        metrics.f1_avg(Average::Weighted),
        total_support
    ));

    report.push_str(&format!(
        "\nExact match: {:.4}\n",
        exact_match(targets, predictions)
    ));

    Ok(report)
}
