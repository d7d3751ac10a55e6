//! Model lifecycle handlers

use axum::{extract::State, Json};

use crate::engine::persist;
use crate::models::predict::{ModelOpResponse, ModelPerformanceResponse};
use crate::{AppError, AppResult, AppState};

/// Evaluation metrics for the live bundle; 503 until one exists.
pub async fn performance(State(state): State<AppState>) -> AppResult<Json<ModelPerformanceResponse>> {
    let bundle = state.engine.current().ok_or(AppError::ModelNotTrained)?;

    Ok(Json(ModelPerformanceResponse {
        accuracy: bundle.mean_metric(|m| m.accuracy),
        precision: bundle.mean_metric(|m| m.precision),
        recall: bundle.mean_metric(|m| m.recall),
        f1_score: bundle.mean_metric(|m| m.f1_score),
        per_hazard: bundle.performance.clone(),
        model_version: bundle.version.clone(),
        last_trained: bundle.last_trained,
        training_data_size: bundle.training_samples,
    }))
}

/// Kick off a retrain in the background and acknowledge immediately.
///
/// Progress is observable through the performance endpoint (last_trained
/// moves once the new bundle installs).
pub async fn retrain(State(state): State<AppState>) -> Json<ModelOpResponse> {
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || {
        engine.retrain();
        tracing::info!("background retrain complete");
    });

    Json(ModelOpResponse { status: "retraining", message: "Model retraining started" })
}

/// Persist the live bundle; 503 if nothing is trained, 500 if the write
/// fails.
pub async fn save(State(state): State<AppState>) -> AppResult<Json<ModelOpResponse>> {
    let bundle = state.engine.current().ok_or(AppError::ModelNotTrained)?;

    let dir = state.engine.model_dir().to_path_buf();
    tokio::task::spawn_blocking(move || persist::save(&bundle, &dir))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;

    Ok(Json(ModelOpResponse { status: "saved", message: "Model saved" }))
}
