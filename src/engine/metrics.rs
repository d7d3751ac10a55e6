//! Held-out evaluation metrics
//!
//! Continuous error metrics plus a binary view: both truth and prediction are
//! thresholded at 5.0 ("high risk") and scored with the usual classification
//! metrics. Stored per hazard; the serving layer reports the unweighted mean
//! across hazards.

use serde::{Deserialize, Serialize};

/// Score above which a sample counts as high-risk for the binary view.
pub const HIGH_RISK_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HazardMetrics {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Evaluate predictions against ground truth.
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> HazardMetrics {
    assert_eq!(y_true.len(), y_pred.len());
    let n = y_true.len().max(1) as f64;

    let mse = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n;
    let mae = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n;

    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let (mut tp, mut tn, mut fp, mut fn_) = (0u64, 0u64, 0u64, 0u64);
    for (t, p) in y_true.iter().zip(y_pred) {
        match (*t > HIGH_RISK_THRESHOLD, *p > HIGH_RISK_THRESHOLD) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
        }
    }

    let accuracy = (tp + tn) as f64 / n;
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    HazardMetrics { mse, mae, r2, accuracy, precision, recall, f1_score }
}

/// Zero when the denominator is zero, matching zero-division conventions.
fn ratio(num: u64, denom: u64) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = vec![1.0, 6.0, 3.0, 8.0, 5.5];
        let m = evaluate(&y, &y);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.f1_score, 1.0);
    }

    #[test]
    fn test_binary_view_uses_threshold() {
        // Truth: low, high. Prediction flips the second one.
        let y_true = vec![2.0, 7.0];
        let y_pred = vec![2.5, 4.0];
        let m = evaluate(&y_true, &y_pred);
        assert_eq!(m.accuracy, 0.5);
        // No predicted positives: precision and recall degrade to zero.
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);
    }

    #[test]
    fn test_r2_zero_for_constant_truth() {
        let y_true = vec![5.0; 4];
        let y_pred = vec![5.0, 4.0, 6.0, 5.0];
        let m = evaluate(&y_true, &y_pred);
        assert_eq!(m.r2, 0.0);
    }
}
