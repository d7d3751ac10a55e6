//! Risk prediction handler

use axum::{extract::State, Json};
use chrono::{Datelike, Utc};
use validator::Validate;

use crate::engine::aggregate::{self, round_confidence, round_score};
use crate::engine::features::FeatureVector;
use crate::models::predict::{PredictRequest, RiskPrediction};
use crate::{AppError, AppResult, AppState};

/// Quake counts above this (trailing 7 days) add a seismicity note to the
/// risk factors.
const RECENT_QUAKE_NOTE_THRESHOLD: u32 = 2;

/// Score disaster risk for a location.
///
/// Optionally enriches the request with live weather before inference; the
/// first call on a cold start may train inline and take a while.
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> AppResult<Json<RiskPrediction>> {
    req.validate()?;

    let (weather, quakes) = if req.include_external_data {
        let (w, q) = tokio::join!(
            state.external.weather(req.latitude, req.longitude),
            state.external.earthquakes(req.latitude, req.longitude, None),
        );
        (Some(w), Some(q))
    } else {
        (None, None)
    };

    let observation = req.resolve(weather.as_ref());
    let features = FeatureVector::from_observation(&observation, Utc::now().ordinal());

    // Inference is cheap, but a cold start trains the whole ensemble here.
    let engine = state.engine.clone();
    let prediction = tokio::task::spawn_blocking(move || engine.predict(&features))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    // Advisory thresholds run on pre-rounding scores.
    let (mut risk_factors, recommendations) = aggregate::advisories(&prediction.scores);
    if let Some(q) = &quakes {
        if q.recent_count_7d > RECENT_QUAKE_NOTE_THRESHOLD {
            risk_factors.push(format!(
                "Recent seismic activity: {} earthquakes in the past week",
                q.recent_count_7d
            ));
        }
    }

    Ok(Json(RiskPrediction {
        flood_risk: round_score(prediction.scores.flood),
        fire_risk: round_score(prediction.scores.fire),
        earthquake_risk: round_score(prediction.scores.earthquake),
        storm_risk: round_score(prediction.scores.storm),
        overall_risk: round_score(prediction.overall),
        confidence: round_confidence(prediction.confidence),
        prediction_timestamp: Utc::now(),
        location_analyzed: format!("{:.4}, {:.4}", req.latitude, req.longitude),
        risk_factors,
        recommendations,
    }))
}
