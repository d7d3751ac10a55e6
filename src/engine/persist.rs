//! Model persistence
//!
//! A trained bundle is written as one JSON artifact per hazard model, one
//! scaler artifact, and one metadata file. Loading requires every artifact
//! to be present and parseable; anything less reports "not found" so callers
//! retrain from scratch instead of running a partially loaded bundle.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::metrics::HazardMetrics;
use super::regressor::BoostedStumps;
use super::scaler::StandardScaler;
use super::{Hazard, ModelBundle};

const SCALER_FILE: &str = "scaler.json";
const METADATA_FILE: &str = "metadata.json";

fn model_file(hazard: Hazard) -> String {
    format!("{}_model.json", hazard.as_str())
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize model artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    model_version: String,
    last_trained: DateTime<Utc>,
    is_trained: bool,
    training_data_size: usize,
    model_performance: BTreeMap<String, HazardMetrics>,
}

/// Persist a trained bundle, creating the directory if absent.
pub fn save(bundle: &ModelBundle, dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(dir)?;

    for hazard in Hazard::ALL {
        write_json(&dir.join(model_file(hazard)), bundle.model(hazard))?;
    }
    write_json(&dir.join(SCALER_FILE), &bundle.scaler)?;

    let meta = Metadata {
        model_version: bundle.version.clone(),
        last_trained: bundle.last_trained,
        is_trained: true,
        training_data_size: bundle.training_samples,
        model_performance: bundle.performance.clone(),
    };
    write_json(&dir.join(METADATA_FILE), &meta)?;

    tracing::info!(dir = %dir.display(), "model bundle persisted");
    Ok(())
}

/// Load a bundle if every artifact is present and valid.
///
/// Any missing file, IO error, or deserialization failure returns `None`;
/// the caller falls back to retraining.
pub fn load(dir: &Path) -> Option<ModelBundle> {
    let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
    let meta: Metadata = read_json(&dir.join(METADATA_FILE))?;
    if !meta.is_trained {
        tracing::debug!("metadata marks bundle untrained, skipping load");
        return None;
    }

    let mut models: Vec<BoostedStumps> = Vec::with_capacity(4);
    for hazard in Hazard::ALL {
        models.push(read_json(&dir.join(model_file(hazard)))?);
    }
    let models: [BoostedStumps; 4] = models.try_into().ok()?;

    Some(ModelBundle::from_parts(
        scaler,
        models,
        meta.model_version,
        meta.last_trained,
        meta.training_data_size,
        meta.model_performance,
    ))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_vec(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "artifact unreadable");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "artifact corrupt");
            None
        }
    }
}
