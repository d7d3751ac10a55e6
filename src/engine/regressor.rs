//! Gradient-boosted stump regressor
//!
//! Each hazard model is a constant base prediction plus a sequence of
//! shrunken depth-1 trees fit to the running residuals. Split candidates are
//! per-feature quantiles computed once at fit time; each round optionally
//! fits on a row subsample drawn from the caller's RNG, so a seeded fit is
//! fully deterministic.
//!
//! The external contract is just fit/predict; predictions are unbounded here
//! and clamped to the 0-10 scale by the bundle.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::features::{FeatureRow, FEATURE_COUNT};

/// Per-hazard training configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hyperparams {
    /// Boosting rounds (one stump each).
    pub rounds: usize,
    /// Shrinkage applied to every stump's contribution.
    pub learning_rate: f64,
    /// Fraction of rows used per round, in (0, 1].
    pub subsample: f64,
    /// Split candidates per feature.
    pub candidates: usize,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self { rounds: 150, learning_rate: 0.1, subsample: 0.9, candidates: 16 }
    }
}

/// One depth-1 decision tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
struct Stump {
    feature: usize,
    threshold: f64,
    left: f64,
    right: f64,
}

impl Stump {
    fn predict(&self, row: &FeatureRow) -> f64 {
        if row[self.feature] <= self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoostedStumps {
    base: f64,
    learning_rate: f64,
    stumps: Vec<Stump>,
}

impl BoostedStumps {
    /// Fit on scaled feature rows and continuous targets.
    pub fn fit<R: Rng>(
        rows: &[FeatureRow],
        targets: &[f64],
        params: &Hyperparams,
        rng: &mut R,
    ) -> Self {
        assert_eq!(rows.len(), targets.len());
        assert!(!rows.is_empty(), "cannot fit on an empty dataset");

        let n = rows.len();
        let base = targets.iter().sum::<f64>() / n as f64;
        let candidates = split_candidates(rows, params.candidates);

        let mut residuals: Vec<f64> = targets.iter().map(|y| y - base).collect();
        let mut stumps = Vec::with_capacity(params.rounds);
        let mut indices: Vec<usize> = (0..n).collect();
        let sample_size = ((n as f64 * params.subsample) as usize).clamp(1, n);

        for _ in 0..params.rounds {
            indices.shuffle(rng);
            let sample = &indices[..sample_size];

            let Some(stump) = best_stump(rows, &residuals, sample, &candidates) else {
                break;
            };

            // Update residuals over the full dataset.
            for (i, row) in rows.iter().enumerate() {
                residuals[i] -= params.learning_rate * stump.predict(row);
            }
            stumps.push(stump);
        }

        Self { base, learning_rate: params.learning_rate, stumps }
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        let boost: f64 = self.stumps.iter().map(|s| s.predict(row)).sum();
        self.base + self.learning_rate * boost
    }

    pub fn predict_all(&self, rows: &[FeatureRow]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    pub fn rounds(&self) -> usize {
        self.stumps.len()
    }
}

/// Per-feature quantile split candidates, computed once per fit.
fn split_candidates(rows: &[FeatureRow], per_feature: usize) -> Vec<Vec<f64>> {
    let mut all = Vec::with_capacity(FEATURE_COUNT);
    for feature in 0..FEATURE_COUNT {
        let mut values: Vec<f64> = rows.iter().map(|r| r[feature]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        let mut cuts = Vec::with_capacity(per_feature);
        if values.len() > 1 {
            for q in 1..=per_feature {
                let idx = q * (values.len() - 1) / (per_feature + 1);
                let cut = values[idx];
                if cuts.last() != Some(&cut) {
                    cuts.push(cut);
                }
            }
        }
        all.push(cuts);
    }
    all
}

/// Pick the squared-error-optimal stump over the sampled rows.
fn best_stump(
    rows: &[FeatureRow],
    residuals: &[f64],
    sample: &[usize],
    candidates: &[Vec<f64>],
) -> Option<Stump> {
    let mut best: Option<(f64, Stump)> = None;

    for (feature, cuts) in candidates.iter().enumerate() {
        for &threshold in cuts {
            let (mut left_sum, mut left_n) = (0.0, 0usize);
            let (mut right_sum, mut right_n) = (0.0, 0usize);
            for &i in sample {
                if rows[i][feature] <= threshold {
                    left_sum += residuals[i];
                    left_n += 1;
                } else {
                    right_sum += residuals[i];
                    right_n += 1;
                }
            }
            if left_n == 0 || right_n == 0 {
                continue;
            }

            let left = left_sum / left_n as f64;
            let right = right_sum / right_n as f64;
            // Variance reduction: sum of squared means weighted by count.
            let gain = left_sum * left + right_sum * right;

            if best.as_ref().map_or(true, |(g, _)| gain > *g) {
                best = Some((gain, Stump { feature, threshold, left, right }));
            }
        }
    }

    best.map(|(_, s)| s)
}
