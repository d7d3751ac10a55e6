//! External feed payloads (weather and seismicity)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for a location, from OpenWeatherMap or the mock
/// generator. `source` is the only signal distinguishing the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: f64,
    pub conditions: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    /// Kilometers.
    pub visibility: f64,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

/// Regional earthquake summary over the trailing year, from USGS or the mock
/// generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuakeSummary {
    pub count: u32,
    pub max_magnitude: f64,
    pub recent_count_7d: u32,
    /// Kilometers below surface.
    pub average_depth: f64,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO date (YYYY-MM-DD).
    pub date: String,
    /// Weekday abbreviation.
    pub day: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub feels_like: f64,
    pub conditions: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub precipitation: f64,
    pub uvi: f64,
    /// Weather-driven risk for the day, 0-10.
    pub risk_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub forecast: Vec<ForecastDay>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

/// Pollutant concentrations in micrograms per cubic meter (CO in
/// milligrams).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqiComponents {
    pub pm2_5: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub co: f64,
}

/// Air quality on the 1-5 OpenWeatherMap AQI scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQuality {
    pub aqi: u8,
    pub level: String,
    pub color: String,
    pub description: String,
    pub components: AqiComponents,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

/// Fixed category mapping for the 1-5 AQI index: (level, color,
/// description). Out-of-range indices collapse to the middle category.
pub fn aqi_category(index: u8) -> (&'static str, &'static str, &'static str) {
    match index {
        1 => ("Good", "green", "Air quality is satisfactory"),
        2 => ("Fair", "yellow", "Air quality is acceptable"),
        4 => ("Poor", "red", "Health effects may be experienced by everyone"),
        5 => (
            "Very Poor",
            "purple",
            "Health alert: everyone may experience serious effects",
        ),
        _ => (
            "Moderate",
            "orange",
            "Sensitive groups may experience health effects",
        ),
    }
}
