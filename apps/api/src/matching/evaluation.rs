//! Held-out classification report. Diagnostic only; nothing on the serving path reads it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matching::labels::LabelSpace;
use crate::matching::MatchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub label_id: usize,
    pub role: String,
    pub domain: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Only labels present in the true or predicted held-out ids.
    pub labels: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub test_size: usize,
}

/// Per-label precision, recall and F1. Zero denominators score 0.
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    labels: &LabelSpace,
) -> Result<EvaluationReport, MatchError> {
    let present: BTreeSet<usize> = y_true.iter().chain(y_pred).copied().collect();

    let mut metrics = Vec::with_capacity(present.len());
    for id in present {
        let label = labels.decode(id)?;
        let true_positive = y_true
            .iter()
            .zip(y_pred)
            .filter(|(t, p)| **t == id && **p == id)
            .count();
        let predicted = y_pred.iter().filter(|p| **p == id).count();
        let support = y_true.iter().filter(|t| **t == id).count();

        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        metrics.push(LabelMetrics {
            label_id: id,
            role: label.role.clone(),
            domain: label.domain.clone(),
            precision,
            recall,
            f1,
            support,
        });
    }

    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    let mean = |f: fn(&LabelMetrics) -> f64| {
        if metrics.is_empty() {
            0.0
        } else {
            metrics.iter().map(f).sum::<f64>() / metrics.len() as f64
        }
    };

    Ok(EvaluationReport {
        accuracy: ratio(correct, y_true.len()),
        macro_precision: mean(|m| m.precision),
        macro_recall: mean(|m| m.recall),
        macro_f1: mean(|m| m.f1),
        test_size: y_true.len(),
        labels: metrics,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelSpace {
        LabelSpace::fit([("A", "x"), ("B", "x"), ("C", "x"), ("D", "x")])
    }

    #[test]
    fn test_perfect_predictions() {
        let report = classification_report(&[0, 1, 2], &[0, 1, 2], &labels()).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_f1, 1.0);
        assert_eq!(report.labels.len(), 3);
    }

    #[test]
    fn test_labels_absent_from_split_are_skipped() {
        let report = classification_report(&[0, 0], &[0, 1], &labels()).unwrap();
        let ids: Vec<_> = report.labels.iter().map(|m| m.label_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_precision_and_recall() {
        // Label 0: tp=1, predicted=2, support=2.
        let report = classification_report(&[0, 0, 1], &[0, 1, 0], &labels()).unwrap();
        let zero = &report.labels[0];
        assert!((zero.precision - 0.5).abs() < 1e-12);
        assert!((zero.recall - 0.5).abs() < 1e-12);
        assert_eq!(zero.support, 2);
        let one = &report.labels[1];
        assert_eq!(one.precision, 0.0);
        assert_eq!(one.f1, 0.0);
        assert!((report.accuracy - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_split() {
        let report = classification_report(&[], &[], &labels()).unwrap();
        assert!(report.labels.is_empty());
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.test_size, 0);
    }
}
