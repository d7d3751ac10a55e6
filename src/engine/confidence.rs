//! Prediction confidence heuristic
//!
//! A proxy for "how far outside the training distribution is this input",
//! not a statistically derived interval: start from a fixed base and subtract
//! a penalty proportional to the fraction of scaled dimensions lying more
//! than two standard deviations from the training mean.

use super::features::FeatureRow;

const BASE_CONFIDENCE: f64 = 0.85;
const EXTREMENESS_PENALTY: f64 = 0.2;
const OUTLIER_Z: f64 = 2.0;

/// Confidence in [0, 1] for an already-scaled feature vector.
pub fn estimate(scaled: &FeatureRow) -> f64 {
    let outliers = scaled.iter().filter(|z| z.abs() > OUTLIER_Z).count();
    let extremeness = outliers as f64 / scaled.len() as f64;
    (BASE_CONFIDENCE - extremeness * EXTREMENESS_PENALTY).clamp(0.0, 1.0)
}
