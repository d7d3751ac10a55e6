//! Prediction request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::features::{defaults, Observation};
use crate::engine::metrics::HazardMetrics;

/// Inference input. Coordinates are required; everything else falls back to
/// fixed defaults (or to the live weather feed for the weather fields).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be in [-90, 90]"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be in [-180, 180]"))]
    pub longitude: f64,

    pub elevation: Option<f64>,
    pub distance_to_coast: Option<f64>,
    pub population_density: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,

    /// Pull live weather/seismic feeds into the prediction. Defaults to true.
    #[serde(default = "default_true")]
    pub include_external_data: bool,
}

fn default_true() -> bool {
    true
}

impl PredictRequest {
    /// Resolve the request into a complete observation, preferring explicit
    /// fields, then fetched weather, then the fixed defaults.
    pub fn resolve(&self, weather: Option<&super::weather::WeatherReport>) -> Observation {
        Observation {
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation.unwrap_or(defaults::ELEVATION),
            distance_to_coast: self.distance_to_coast.unwrap_or(defaults::DISTANCE_TO_COAST),
            population_density: self.population_density.unwrap_or(defaults::POPULATION_DENSITY),
            temperature: self
                .temperature
                .or(weather.map(|w| w.temperature))
                .unwrap_or(defaults::TEMPERATURE),
            humidity: self
                .humidity
                .or(weather.map(|w| w.humidity))
                .unwrap_or(defaults::HUMIDITY),
            pressure: self
                .pressure
                .or(weather.map(|w| w.pressure))
                .unwrap_or(defaults::PRESSURE),
            wind_speed: self
                .wind_speed
                .or(weather.map(|w| w.wind_speed))
                .unwrap_or(defaults::WIND_SPEED),
        }
    }
}

/// Prediction response. Scores are display-rounded (one decimal; confidence
/// two decimals); threshold logic upstream ran on pre-rounding values.
#[derive(Debug, Clone, Serialize)]
pub struct RiskPrediction {
    pub flood_risk: f64,
    pub fire_risk: f64,
    pub earthquake_risk: f64,
    pub storm_risk: f64,
    pub overall_risk: f64,
    pub confidence: f64,
    pub prediction_timestamp: DateTime<Utc>,
    pub location_analyzed: String,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Aggregate + per-hazard model metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ModelPerformanceResponse {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub per_hazard: std::collections::BTreeMap<String, HazardMetrics>,
    pub model_version: String,
    pub last_trained: DateTime<Utc>,
    pub training_data_size: usize,
}

/// Acknowledgement for asynchronously executed model operations.
#[derive(Debug, Clone, Serialize)]
pub struct ModelOpResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> PredictRequest {
        serde_json::from_value(serde_json::json!({
            "latitude": 37.7749,
            "longitude": -122.4194
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_optionals_use_fixed_defaults() {
        let obs = base_request().resolve(None);
        assert_eq!(obs.elevation, 200.0);
        assert_eq!(obs.distance_to_coast, 50.0);
        assert_eq!(obs.population_density, 100.0);
        assert_eq!(obs.temperature, 20.0);
        assert_eq!(obs.humidity, 60.0);
        assert_eq!(obs.pressure, 1013.0);
        assert_eq!(obs.wind_speed, 5.0);
    }

    #[test]
    fn test_explicit_fields_win_over_weather() {
        let mut req = base_request();
        req.temperature = Some(31.0);
        let weather = super::super::weather::WeatherReport {
            temperature: 12.0,
            conditions: "overcast".into(),
            humidity: 80.0,
            wind_speed: 9.0,
            pressure: 1001.0,
            visibility: 10.0,
            source: "mock".into(),
            last_updated: Utc::now(),
        };
        let obs = req.resolve(Some(&weather));
        assert_eq!(obs.temperature, 31.0);
        // Unset fields fall back to the feed.
        assert_eq!(obs.humidity, 80.0);
        assert_eq!(obs.pressure, 1001.0);
    }

    #[test]
    fn test_validation_rejects_out_of_range_coordinates() {
        use validator::Validate;
        let mut req = base_request();
        req.latitude = 91.0;
        assert!(req.validate().is_err());
        req.latitude = 45.0;
        req.longitude = -200.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_include_external_defaults_true() {
        assert!(base_request().include_external_data);
    }
}
