//! Hazardcast backend server
//!
//! Multi-hazard disaster risk estimation over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HAZARDCAST                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐ │
//! │  │  API      │  │  Risk Engine │  │  External Feeds      │ │
//! │  │  Gateway  │  │  (4 hazard   │  │  (weather/seismic,   │ │
//! │  │  (Axum)   │  │   models)    │  │   TTL cached)        │ │
//! │  └─────┬─────┘  └──────┬───────┘  └──────────┬───────────┘ │
//! │        └───────────────┼─────────────────────┘             │
//! │                        ▼                                    │
//! │                ┌──────────────┐                            │
//! │                │ Model store  │                            │
//! │                │ (flat JSON)  │                            │
//! │                └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod external;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engine::{ModelHandle, TrainOptions};
use external::ExternalDataService;
use models::alert::AlertStore;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging; production deployments default to a quieter
    // filter unless RUST_LOG overrides it.
    let default_filter = if config.is_production() {
        "hazardcast=info,tower_http=info"
    } else {
        "hazardcast=debug,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Hazardcast server starting...");
    tracing::info!("Model directory: {}", config.model_dir);

    let engine = Arc::new(ModelHandle::new(
        config.model_dir.clone(),
        TrainOptions { samples: config.training_samples, ..TrainOptions::default() },
    ));
    let external = Arc::new(ExternalDataService::new(&config));

    // Build application state
    let state = AppState {
        engine: engine.clone(),
        external,
        alerts: Arc::new(AlertStore::new()),
        config: config.clone(),
    };

    // Warm the models off the request path: load persisted artifacts or
    // train fresh ones while the server is already accepting traffic.
    tokio::task::spawn_blocking(move || {
        engine.ensure_ready();
        tracing::info!("hazard models ready");
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind port");
    axum::serve(listener, app).await.expect("server error");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ModelHandle>,
    pub external: Arc<ExternalDataService>,
    pub alerts: Arc<AlertStore>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))

        // Prediction
        .route("/api/v1/predict", post(handlers::predict::predict))

        // Model lifecycle
        .route("/api/v1/model/performance", get(handlers::model::performance))
        .route("/api/v1/model/retrain", post(handlers::model::retrain))
        .route("/api/v1/model/save", post(handlers::model::save))

        // External feeds
        .route("/api/v1/weather/:lat/:lon", get(handlers::weather::current))
        .route("/api/v1/weather/forecast/:lat/:lon", get(handlers::weather::forecast))
        .route("/api/v1/weather/air-quality/:lat/:lon", get(handlers::weather::air_quality))
        .route("/api/v1/earthquakes/:lat/:lon", get(handlers::weather::earthquakes))

        // Alerts
        .route("/api/v1/alerts", get(handlers::alerts::list))
        .route("/api/v1/alerts", post(handlers::alerts::create))
        .route("/api/v1/alerts/emergency", post(handlers::alerts::emergency))
        .route("/api/v1/alerts/statistics", get(handlers::alerts::statistics))
        .route("/api/v1/alerts/location/:lat/:lon", get(handlers::alerts::location))
        .route("/api/v1/alerts/:id", get(handlers::alerts::get))
        .route("/api/v1/alerts/:id", put(handlers::alerts::update))
        .route("/api/v1/alerts/:id", delete(handlers::alerts::delete))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
