//! Risk-scoring engine
//!
//! Four independently trained regressors (flood, fire, earthquake, storm)
//! over a shared feature scaler, trained on synthetic data and combined into
//! an overall score with derived advisories.
//!
//! The live bundle sits behind [`ModelHandle`]: an `Arc<ModelBundle>` swapped
//! wholesale on retrain. A prediction that races a retrain observes either
//! the old or the new bundle; that is the documented contract, not a hidden
//! race - risk estimates are eventually consistent.

pub mod aggregate;
pub mod confidence;
pub mod features;
pub mod metrics;
pub mod persist;
pub mod regressor;
pub mod scaler;
pub mod synth;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use features::{FeatureRow, FeatureVector};
use metrics::HazardMetrics;
use regressor::{BoostedStumps, Hyperparams};
use scaler::StandardScaler;

pub const MODEL_VERSION: &str = "2.1.0";

/// Fraction of samples held out for evaluation.
const TEST_FRACTION: f64 = 0.2;

// ============================================================================
// HAZARDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    Flood,
    Fire,
    Earthquake,
    Storm,
}

impl Hazard {
    pub const ALL: [Hazard; 4] = [Hazard::Flood, Hazard::Fire, Hazard::Earthquake, Hazard::Storm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hazard::Flood => "flood",
            Hazard::Fire => "fire",
            Hazard::Earthquake => "earthquake",
            Hazard::Storm => "storm",
        }
    }

    /// Weight in the overall risk score. Weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Hazard::Flood => 0.30,
            Hazard::Fire => 0.25,
            Hazard::Earthquake => 0.20,
            Hazard::Storm => 0.25,
        }
    }

    fn index(&self) -> usize {
        match self {
            Hazard::Flood => 0,
            Hazard::Fire => 1,
            Hazard::Earthquake => 2,
            Hazard::Storm => 3,
        }
    }

    /// Per-hazard boosting configuration.
    fn hyperparams(&self) -> Hyperparams {
        match self {
            Hazard::Flood => {
                Hyperparams { rounds: 160, learning_rate: 0.10, subsample: 0.90, candidates: 16 }
            }
            Hazard::Fire => {
                Hyperparams { rounds: 150, learning_rate: 0.08, subsample: 0.85, candidates: 16 }
            }
            Hazard::Earthquake => {
                Hyperparams { rounds: 120, learning_rate: 0.08, subsample: 0.85, candidates: 16 }
            }
            Hazard::Storm => {
                Hyperparams { rounds: 180, learning_rate: 0.07, subsample: 0.90, candidates: 16 }
            }
        }
    }
}

/// Per-hazard scores, already clamped to the 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardScores {
    pub flood: f64,
    pub fire: f64,
    pub earthquake: f64,
    pub storm: f64,
}

impl HazardScores {
    pub fn get(&self, hazard: Hazard) -> f64 {
        match hazard {
            Hazard::Flood => self.flood,
            Hazard::Fire => self.fire,
            Hazard::Earthquake => self.earthquake,
            Hazard::Storm => self.storm,
        }
    }
}

/// Raw engine output for one inference, pre display rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnginePrediction {
    pub scores: HazardScores,
    pub overall: f64,
    pub confidence: f64,
}

// ============================================================================
// TRAINING
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Synthetic samples to generate.
    pub samples: usize,
    /// Seed for the generator, the split, and the boosting subsamples.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self { samples: 8000, seed: 42 }
    }
}

/// Trained scaler, four hazard models, and evaluation metadata.
///
/// Immutable once built; retraining produces a fresh bundle that replaces
/// this one wholesale.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub scaler: StandardScaler,
    models: [BoostedStumps; 4],
    pub version: String,
    pub last_trained: DateTime<Utc>,
    /// Size of the synthetic dataset this bundle was actually fit on; kept
    /// with the bundle so a reload reports the real figure, not the current
    /// configuration.
    pub training_samples: usize,
    pub performance: BTreeMap<String, HazardMetrics>,
}

impl ModelBundle {
    /// Train a fresh bundle from synthetic data.
    pub fn train(opts: &TrainOptions) -> Self {
        tracing::info!(samples = opts.samples, seed = opts.seed, "training hazard models");
        let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
        let data = synth::generate(opts.samples, &mut rng);
        let n = data.len();

        // One shared partition so the same test rows evaluate all four
        // hazards.
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let test_len = ((n as f64 * TEST_FRACTION) as usize).min(n.saturating_sub(1));
        let (test_idx, train_idx) = indices.split_at(test_len);

        let train_rows: Vec<FeatureRow> = train_idx.iter().map(|&i| data.features[i]).collect();
        let test_rows: Vec<FeatureRow> = test_idx.iter().map(|&i| data.features[i]).collect();

        // Scaler is fit on the training partition only.
        let scaler = StandardScaler::fit(&train_rows);
        let train_scaled = scaler.transform_all(&train_rows);
        let test_scaled = scaler.transform_all(&test_rows);

        let mut performance = BTreeMap::new();
        let models = Hazard::ALL.map(|hazard| {
            let labels = data.labels(hazard);
            let y_train: Vec<f64> = train_idx.iter().map(|&i| labels[i]).collect();
            let y_test: Vec<f64> = test_idx.iter().map(|&i| labels[i]).collect();

            let model =
                BoostedStumps::fit(&train_scaled, &y_train, &hazard.hyperparams(), &mut rng);
            let m = metrics::evaluate(&y_test, &model.predict_all(&test_scaled));
            tracing::info!(
                hazard = hazard.as_str(),
                rounds = model.rounds(),
                mse = m.mse,
                r2 = m.r2,
                accuracy = m.accuracy,
                "hazard model fitted"
            );
            performance.insert(hazard.as_str().to_string(), m);
            model
        });

        Self {
            scaler,
            models,
            version: MODEL_VERSION.to_string(),
            last_trained: Utc::now(),
            training_samples: opts.samples,
            performance,
        }
    }

    pub(crate) fn from_parts(
        scaler: StandardScaler,
        models: [BoostedStumps; 4],
        version: String,
        last_trained: DateTime<Utc>,
        training_samples: usize,
        performance: BTreeMap<String, HazardMetrics>,
    ) -> Self {
        Self { scaler, models, version, last_trained, training_samples, performance }
    }

    pub(crate) fn model(&self, hazard: Hazard) -> &BoostedStumps {
        &self.models[hazard.index()]
    }

    /// Score all four hazards for one feature vector.
    ///
    /// Raw model outputs are unbounded; they are clamped to 0-10 here before
    /// anything downstream sees them.
    pub fn predict(&self, features: &FeatureVector) -> EnginePrediction {
        let scaled = self.scaler.transform(features.as_row());

        let score = |hazard: Hazard| self.model(hazard).predict(&scaled).clamp(0.0, 10.0);
        let scores = HazardScores {
            flood: score(Hazard::Flood),
            fire: score(Hazard::Fire),
            earthquake: score(Hazard::Earthquake),
            storm: score(Hazard::Storm),
        };

        EnginePrediction {
            scores,
            overall: aggregate::overall_risk(&scores).clamp(0.0, 10.0),
            confidence: confidence::estimate(&scaled),
        }
    }

    /// Unweighted mean of a metric across the four hazards.
    pub fn mean_metric(&self, pick: impl Fn(&HazardMetrics) -> f64) -> f64 {
        if self.performance.is_empty() {
            return 0.0;
        }
        self.performance.values().map(&pick).sum::<f64>() / self.performance.len() as f64
    }
}

// ============================================================================
// LIVE BUNDLE HANDLE
// ============================================================================

/// Atomically swappable reference to the live bundle.
///
/// Retrain builds a new bundle off to the side and installs it with a single
/// write; readers clone the `Arc` and keep using whichever bundle they got.
pub struct ModelHandle {
    bundle: RwLock<Option<Arc<ModelBundle>>>,
    model_dir: PathBuf,
    train_options: TrainOptions,
}

impl ModelHandle {
    pub fn new(model_dir: impl Into<PathBuf>, train_options: TrainOptions) -> Self {
        Self { bundle: RwLock::new(None), model_dir: model_dir.into(), train_options }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn is_trained(&self) -> bool {
        self.bundle.read().is_some()
    }

    /// The live bundle, if any.
    pub fn current(&self) -> Option<Arc<ModelBundle>> {
        self.bundle.read().clone()
    }

    /// Install a bundle, replacing the previous one wholesale.
    pub fn install(&self, bundle: ModelBundle) -> Arc<ModelBundle> {
        let arc = Arc::new(bundle);
        *self.bundle.write() = Some(arc.clone());
        arc
    }

    /// Get a usable bundle: live > persisted > trained inline.
    ///
    /// The inline-training path is a deliberate latency cliff on the first
    /// prediction after a cold start with no artifacts on disk.
    pub fn ensure_ready(&self) -> Arc<ModelBundle> {
        if let Some(bundle) = self.current() {
            return bundle;
        }
        if let Some(bundle) = persist::load(&self.model_dir) {
            tracing::info!(dir = %self.model_dir.display(), "loaded persisted model bundle");
            return self.install(bundle);
        }
        tracing::warn!("no model bundle available, training inline");
        self.retrain()
    }

    /// Train a fresh bundle, install it, and persist it best-effort.
    pub fn retrain(&self) -> Arc<ModelBundle> {
        let bundle = ModelBundle::train(&self.train_options);
        if let Err(e) = persist::save(&bundle, &self.model_dir) {
            tracing::error!(error = %e, "failed to persist bundle after training");
        }
        self.install(bundle)
    }

    /// Predict for one feature vector, initializing the bundle if needed.
    pub fn predict(&self, features: &FeatureVector) -> EnginePrediction {
        self.ensure_ready().predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use features::{defaults, Observation};
    use std::sync::OnceLock;

    /// One shared bundle so each test does not pay for training.
    pub(crate) fn test_bundle() -> &'static ModelBundle {
        static BUNDLE: OnceLock<ModelBundle> = OnceLock::new();
        BUNDLE.get_or_init(|| ModelBundle::train(&TrainOptions { samples: 2500, seed: 42 }))
    }

    pub(crate) fn observation(latitude: f64, longitude: f64) -> Observation {
        Observation {
            latitude,
            longitude,
            elevation: defaults::ELEVATION,
            distance_to_coast: defaults::DISTANCE_TO_COAST,
            population_density: defaults::POPULATION_DENSITY,
            temperature: defaults::TEMPERATURE,
            humidity: defaults::HUMIDITY,
            pressure: defaults::PRESSURE,
            wind_speed: defaults::WIND_SPEED,
        }
    }

    #[test]
    fn test_predictions_are_bounded() {
        let bundle = test_bundle();
        // Deliberately absurd inputs still come back clamped.
        let extreme = Observation {
            latitude: 69.0,
            longitude: 179.0,
            elevation: 90_000.0,
            distance_to_coast: -500.0,
            population_density: 1e9,
            temperature: 90.0,
            humidity: 0.0,
            pressure: 400.0,
            wind_speed: 500.0,
        };
        for obs in [observation(37.7749, -122.4194), extreme] {
            let p = bundle.predict(&FeatureVector::from_observation(&obs, 180));
            for hazard in Hazard::ALL {
                assert!((0.0..=10.0).contains(&p.scores.get(hazard)));
            }
            assert!((0.0..=10.0).contains(&p.overall));
            assert!((0.0..=1.0).contains(&p.confidence));
        }
    }

    #[test]
    fn test_overall_matches_weighted_sum() {
        let bundle = test_bundle();
        let p = bundle.predict(&FeatureVector::from_observation(&observation(10.0, 20.0), 90));
        let expected = p.scores.flood * 0.30
            + p.scores.fire * 0.25
            + p.scores.earthquake * 0.20
            + p.scores.storm * 0.25;
        assert!((p.overall - expected).abs() < 1e-12);
    }

    #[test]
    fn test_seismic_zone_scores_above_control() {
        let bundle = test_bundle();
        let sf = bundle
            .predict(&FeatureVector::from_observation(&observation(37.7749, -122.4194), 180));
        let control =
            bundle.predict(&FeatureVector::from_observation(&observation(0.0, 0.0), 180));
        assert!(
            sf.scores.earthquake > control.scores.earthquake,
            "SF {} vs control {}",
            sf.scores.earthquake,
            control.scores.earthquake
        );
    }

    #[test]
    fn test_metrics_recorded_for_every_hazard() {
        let bundle = test_bundle();
        assert_eq!(bundle.performance.len(), 4);
        for hazard in Hazard::ALL {
            let m = bundle.performance.get(hazard.as_str()).unwrap();
            assert!(m.mse.is_finite());
            assert!((0.0..=1.0).contains(&m.accuracy));
        }
        assert!(bundle.mean_metric(|m| m.accuracy) > 0.0);
    }

    #[test]
    fn test_handle_swaps_bundle_on_install() {
        let dir = tempfile::tempdir().unwrap();
        let handle = ModelHandle::new(dir.path(), TrainOptions { samples: 2500, seed: 42 });
        assert!(!handle.is_trained());
        assert!(handle.current().is_none());

        let first = handle.install(test_bundle().clone());
        assert!(handle.is_trained());

        let second = handle.install(test_bundle().clone());
        assert!(!Arc::ptr_eq(&first, &second));
        // The old Arc keeps working after the swap.
        let fv = FeatureVector::from_observation(&observation(0.0, 0.0), 1);
        assert_eq!(first.predict(&fv), second.predict(&fv));
    }
}
