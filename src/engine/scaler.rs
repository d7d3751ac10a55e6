//! Standard scaler - per-dimension z-score normalization
//!
//! Fit once on the training partition, then applied unchanged to test rows
//! and every inference vector. Immutable after fit except on retrain, when
//! the whole bundle is replaced.

use serde::{Deserialize, Serialize};

use super::features::{FeatureRow, FEATURE_COUNT};

/// Floor on the per-dimension standard deviation to avoid division blowups
/// on near-constant columns.
const STD_FLOOR: f64 = 1e-8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    std: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fit mean/std on the given rows.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let n = rows.len().max(1) as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        let mut var = [0.0; FEATURE_COUNT];
        for row in rows {
            for i in 0..FEATURE_COUNT {
                let d = row[i] - mean[i];
                var[i] += d * d;
            }
        }
        let mut std = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            std[i] = (var[i] / n).sqrt().max(STD_FLOOR);
        }

        Self { mean, std }
    }

    /// Transform one row into z-scores.
    pub fn transform(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (row[i] - self.mean[i]) / self.std[i];
        }
        out
    }

    /// Transform many rows.
    pub fn transform_all(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
