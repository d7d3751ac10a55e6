//! External feed handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::weather::{AirQuality, Forecast, QuakeSummary, WeatherReport};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct QuakeQuery {
    pub radius_km: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<usize>,
}

fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::ValidationError("latitude must be in [-90, 90]".to_string()));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::ValidationError("longitude must be in [-180, 180]".to_string()));
    }
    Ok(())
}

/// Current weather for a location (live or mock, see `source`).
pub async fn current(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>,
) -> AppResult<Json<WeatherReport>> {
    check_coordinates(lat, lon)?;
    Ok(Json(state.external.weather(lat, lon).await))
}

/// Daily forecast, up to seven days.
pub async fn forecast(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<Forecast>> {
    check_coordinates(lat, lon)?;
    Ok(Json(state.external.forecast(lat, lon, query.days).await))
}

/// Air quality index for a location.
pub async fn air_quality(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>,
) -> AppResult<Json<AirQuality>> {
    check_coordinates(lat, lon)?;
    Ok(Json(state.external.air_quality(lat, lon).await))
}

/// Trailing-year earthquake summary around a location.
pub async fn earthquakes(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(query): Query<QuakeQuery>,
) -> AppResult<Json<QuakeSummary>> {
    check_coordinates(lat, lon)?;
    Ok(Json(state.external.earthquakes(lat, lon, query.radius_km).await))
}
