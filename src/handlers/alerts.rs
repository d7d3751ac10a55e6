//! Alert CRUD handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::alert::{
    self, Alert, AlertFilter, AlertList, AlertStats, CreateAlert, CreateEmergencyAlert,
    LocationAlerts, UpdateAlert,
};
use crate::{AppError, AppResult, AppState};

const DEFAULT_LOCATION_RADIUS_KM: f64 = 50.0;

/// List alerts, optionally filtered by activity and severity.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> Json<AlertList> {
    let alerts = state.alerts.list(&filter);
    Json(AlertList { total_count: alerts.len(), alerts, last_updated: Utc::now() })
}

/// Create a new alert.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAlert>,
) -> AppResult<Json<Alert>> {
    if req.title.trim().is_empty() {
        return Err(AppError::ValidationError("alert title must not be empty".to_string()));
    }
    Ok(Json(state.alerts.create(req)))
}

/// Create a critical emergency alert with the fixed contact catalog.
pub async fn emergency(
    State(state): State<AppState>,
    Json(req): Json<CreateEmergencyAlert>,
) -> Json<Alert> {
    let alert = state.alerts.create(req.into_create());
    tracing::warn!(alert_id = %alert.id, "emergency alert created");
    Json(alert)
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub radius_km: Option<f64>,
}

/// Alerts relevant to a location: stored alerts within the radius plus
/// synthesized area alerts.
pub async fn location(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<LocationAlerts>> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::ValidationError("coordinates out of range".to_string()));
    }
    let radius_km = query.radius_km.unwrap_or(DEFAULT_LOCATION_RADIUS_KM);

    let mut alerts: Vec<Alert> = state
        .alerts
        .list(&AlertFilter::default())
        .into_iter()
        .filter(|a| a.affects(lat, lon, radius_km))
        .collect();
    alerts.extend(alert::location_alerts(&mut ChaCha8Rng::from_entropy(), lat, lon));

    Ok(Json(LocationAlerts {
        latitude: lat,
        longitude: lon,
        radius_km,
        total_count: alerts.len(),
        alerts,
        last_updated: Utc::now(),
    }))
}

/// Get a single alert.
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Alert>> {
    state
        .alerts
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))
}

/// Partially update an alert.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAlert>,
) -> AppResult<Json<Alert>> {
    state
        .alerts
        .update(id, req)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))
}

/// Delete an alert.
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Alert>> {
    state
        .alerts
        .delete(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))
}

/// Aggregate counts over the alert store.
pub async fn statistics(State(state): State<AppState>) -> Json<AlertStats> {
    Json(state.alerts.statistics())
}
