//! Feature schema - the ordered input vector the models are fit on
//!
//! Every scaler/model in the bundle is fit on exactly this layout. Inference
//! must construct the same 14 dimensions in the same order; the fields the
//! HTTP surface does not carry are defaulted deterministically here so the
//! serving-time vector never diverges from the training-time schema.

use serde::{Deserialize, Serialize};

/// Number of feature dimensions.
pub const FEATURE_COUNT: usize = 14;

/// Feature names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "latitude",
    "longitude",
    "elevation",
    "distance_to_coast",
    "population_density",
    "temperature",
    "humidity",
    "pressure",
    "wind_speed",
    "precipitation",
    "vegetation_index",
    "soil_moisture",
    "temperature_delta",
    "seasonal_factor",
];

/// One observation in model order.
pub type FeatureRow = [f64; FEATURE_COUNT];

/// Defaults applied when the caller omits an optional field.
pub mod defaults {
    pub const ELEVATION: f64 = 200.0;
    pub const DISTANCE_TO_COAST: f64 = 50.0;
    pub const POPULATION_DENSITY: f64 = 100.0;
    pub const TEMPERATURE: f64 = 20.0;
    pub const HUMIDITY: f64 = 60.0;
    pub const PRESSURE: f64 = 1013.0;
    pub const WIND_SPEED: f64 = 5.0;
    pub const VEGETATION_INDEX: f64 = 0.5;
}

/// Observed inputs for a single inference, before schema completion.
///
/// Only the nine fields the API carries; the remaining five training-time
/// dimensions are derived in [`FeatureVector::from_observation`].
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub distance_to_coast: f64,
    pub population_density: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
}

/// A complete feature vector in the training-time schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector(pub FeatureRow);

impl FeatureVector {
    /// Complete an observation into the full 14-dimension schema.
    ///
    /// Derived dimensions: precipitation 0, vegetation index 0.5,
    /// soil moisture from humidity, temperature delta 0, seasonal factor
    /// from the day of year. All deterministic for a given observation
    /// and date.
    pub fn from_observation(obs: &Observation, day_of_year: u32) -> Self {
        Self([
            obs.latitude,
            obs.longitude,
            obs.elevation,
            obs.distance_to_coast,
            obs.population_density,
            obs.temperature,
            obs.humidity,
            obs.pressure,
            obs.wind_speed,
            0.0,
            defaults::VEGETATION_INDEX,
            (obs.humidity / 100.0).clamp(0.0, 1.0),
            0.0,
            seasonal_factor(day_of_year),
        ])
    }

    pub fn as_row(&self) -> &FeatureRow {
        &self.0
    }
}

/// Seasonal phase in [-1, 1] for a day of year.
pub fn seasonal_factor(day_of_year: u32) -> f64 {
    (2.0 * std::f64::consts::PI * day_of_year as f64 / 365.0).sin()
}
