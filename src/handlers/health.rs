//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    models_trained: bool,
    cached_feed_entries: usize,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        models_trained: state.engine.is_trained(),
        cached_feed_entries: state.external.cached_entries(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
