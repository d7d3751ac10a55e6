//! External data feeds (OpenWeatherMap weather, USGS seismicity)
//!
//! Feed failures never reach the caller: any timeout, transport error, or
//! non-200 response substitutes the mock generator, and only the `source`
//! field gives it away. Responses are held in per-feed TTL caches keyed by
//! rounded coordinates.

pub mod cache;
pub mod mock;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::config::Config;
use crate::models::weather::{
    aqi_category, AirQuality, AqiComponents, Forecast, ForecastDay, QuakeSummary, WeatherReport,
};
use cache::{GeoKey, TtlCache};

const OPENWEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5/weather";
const ONECALL_BASE: &str = "https://api.openweathermap.org/data/3.0/onecall";
const AIR_POLLUTION_BASE: &str = "https://api.openweathermap.org/data/2.5/air_pollution";
const USGS_BASE: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
const DEMO_KEY: &str = "demo_key";
const DEFAULT_QUAKE_RADIUS_KM: u32 = 500;
const MAX_FORECAST_DAYS: usize = 7;

pub struct ExternalDataService {
    client: reqwest::Client,
    api_key: String,
    /// Demo deployments stay fully offline; both feeds go straight to the
    /// mock generators.
    offline: bool,
    weather_cache: TtlCache<GeoKey, WeatherReport>,
    quake_cache: TtlCache<GeoKey, QuakeSummary>,
    forecast_cache: TtlCache<GeoKey, Forecast>,
    aqi_cache: TtlCache<GeoKey, AirQuality>,
    rng: Mutex<ChaCha8Rng>,
    feed_calls: AtomicU64,
}

impl ExternalDataService {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.external_timeout_secs))
            .build()
            .unwrap_or_default();
        let ttl = Duration::from_secs(config.cache_ttl_secs);

        Self {
            client,
            offline: config.openweather_api_key == DEMO_KEY,
            api_key: config.openweather_api_key.clone(),
            weather_cache: TtlCache::new(ttl, config.cache_capacity),
            quake_cache: TtlCache::new(ttl, config.cache_capacity),
            forecast_cache: TtlCache::new(ttl, config.cache_capacity),
            aqi_cache: TtlCache::new(ttl, config.cache_capacity),
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
            feed_calls: AtomicU64::new(0),
        }
    }

    /// Current weather for a location; cached, mock on any feed failure.
    pub async fn weather(&self, latitude: f64, longitude: f64) -> WeatherReport {
        let key = GeoKey::new(latitude, longitude, 0);
        if let Some(hit) = self.weather_cache.get(&key) {
            return hit;
        }

        self.feed_calls.fetch_add(1, Ordering::Relaxed);
        let report = if self.offline {
            mock::mock_weather(&mut *self.rng.lock(), latitude, longitude)
        } else {
            match self.fetch_weather(latitude, longitude).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(error = %e, "weather fetch failed, using mock data");
                    mock::mock_weather(&mut *self.rng.lock(), latitude, longitude)
                }
            }
        };

        self.weather_cache.insert(key, report.clone());
        report
    }

    /// Trailing-year seismicity summary; cached, mock on any feed failure.
    pub async fn earthquakes(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: Option<u32>,
    ) -> QuakeSummary {
        let radius_km = radius_km.unwrap_or(DEFAULT_QUAKE_RADIUS_KM);
        let key = GeoKey::new(latitude, longitude, radius_km);
        if let Some(hit) = self.quake_cache.get(&key) {
            return hit;
        }

        self.feed_calls.fetch_add(1, Ordering::Relaxed);
        let summary = if self.offline {
            mock::mock_quakes(&mut *self.rng.lock())
        } else {
            match self.fetch_quakes(latitude, longitude, radius_km).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!(error = %e, "earthquake fetch failed, using mock data");
                    mock::mock_quakes(&mut *self.rng.lock())
                }
            }
        };

        self.quake_cache.insert(key, summary.clone());
        summary
    }

    /// Daily forecast for up to seven days; cached, mock on any feed failure.
    pub async fn forecast(&self, latitude: f64, longitude: f64, days: Option<usize>) -> Forecast {
        let days = days.unwrap_or(MAX_FORECAST_DAYS).clamp(1, MAX_FORECAST_DAYS);
        let key = GeoKey::new(latitude, longitude, days as u32);
        if let Some(hit) = self.forecast_cache.get(&key) {
            return hit;
        }

        self.feed_calls.fetch_add(1, Ordering::Relaxed);
        let forecast = if self.offline {
            mock::mock_forecast(&mut *self.rng.lock(), latitude, days)
        } else {
            match self.fetch_forecast(latitude, longitude, days).await {
                Ok(forecast) => forecast,
                Err(e) => {
                    tracing::warn!(error = %e, "forecast fetch failed, using mock data");
                    mock::mock_forecast(&mut *self.rng.lock(), latitude, days)
                }
            }
        };

        self.forecast_cache.insert(key, forecast.clone());
        forecast
    }

    /// Air quality index for a location; cached, mock on any feed failure.
    pub async fn air_quality(&self, latitude: f64, longitude: f64) -> AirQuality {
        let key = GeoKey::new(latitude, longitude, 0);
        if let Some(hit) = self.aqi_cache.get(&key) {
            return hit;
        }

        self.feed_calls.fetch_add(1, Ordering::Relaxed);
        let quality = if self.offline {
            mock::mock_air_quality(&mut *self.rng.lock(), latitude)
        } else {
            match self.fetch_air_quality(latitude, longitude).await {
                Ok(quality) => quality,
                Err(e) => {
                    tracing::warn!(error = %e, "air quality fetch failed, using mock data");
                    mock::mock_air_quality(&mut *self.rng.lock(), latitude)
                }
            }
        };

        self.aqi_cache.insert(key, quality.clone());
        quality
    }

    /// Feed invocations so far (cache hits excluded).
    pub fn feed_call_count(&self) -> u64 {
        self.feed_calls.load(Ordering::Relaxed)
    }

    pub fn cached_entries(&self) -> usize {
        self.weather_cache.len()
            + self.quake_cache.len()
            + self.forecast_cache.len()
            + self.aqi_cache.len()
    }

    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherReport> {
        let response = self
            .client
            .get(OPENWEATHER_BASE)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("weather request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("weather API returned {}", response.status()));
        }
        let body: OwmResponse = response.json().await.context("weather body unparseable")?;

        Ok(WeatherReport {
            temperature: body.main.temp,
            conditions: body
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            humidity: body.main.humidity,
            wind_speed: body.wind.speed * 2.237, // m/s to mph
            pressure: body.main.pressure,
            visibility: body.visibility.unwrap_or(10_000.0) / 1000.0, // m to km
            source: "openweathermap".to_string(),
            last_updated: Utc::now(),
        })
    }

    async fn fetch_quakes(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<QuakeSummary> {
        // Bounding box: one degree is roughly 111 km.
        let lat_range = radius_km as f64 / 111.0;
        let lon_range = radius_km as f64 / (111.0 * latitude.to_radians().cos().abs().max(0.01));
        let start = (Utc::now() - ChronoDuration::days(365)).format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(USGS_BASE)
            .query(&[
                ("format", "geojson".to_string()),
                ("starttime", start),
                ("minmagnitude", "2.0".to_string()),
                ("minlatitude", (latitude - lat_range).to_string()),
                ("maxlatitude", (latitude + lat_range).to_string()),
                ("minlongitude", (longitude - lon_range).to_string()),
                ("maxlongitude", (longitude + lon_range).to_string()),
                ("orderby", "time-desc".to_string()),
            ])
            .send()
            .await
            .context("earthquake request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("USGS API returned {}", response.status()));
        }
        let body: UsgsResponse = response.json().await.context("quake body unparseable")?;

        let week_ago_ms = (Utc::now() - ChronoDuration::days(7)).timestamp_millis();
        let count = body.features.len() as u32;
        let max_magnitude = body
            .features
            .iter()
            .filter_map(|f| f.properties.mag)
            .fold(0.0_f64, f64::max);
        let recent_count_7d = body
            .features
            .iter()
            .filter(|f| f.properties.time > week_ago_ms)
            .count() as u32;
        let average_depth = if body.features.is_empty() {
            0.0
        } else {
            body.features
                .iter()
                .map(|f| f.geometry.coordinates.get(2).copied().unwrap_or(0.0))
                .sum::<f64>()
                / body.features.len() as f64
        };

        Ok(QuakeSummary {
            count,
            max_magnitude,
            recent_count_7d,
            average_depth,
            source: "usgs".to_string(),
            last_updated: Utc::now(),
        })
    }

    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> Result<Forecast> {
        let response = self
            .client
            .get(ONECALL_BASE)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("exclude", "current,minutely,hourly,alerts".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("forecast API returned {}", response.status()));
        }
        let body: OneCallResponse = response.json().await.context("forecast body unparseable")?;

        let forecast = body
            .daily
            .iter()
            .take(days)
            .map(|d| {
                let date = chrono::DateTime::from_timestamp(d.dt, 0).unwrap_or_default();
                let precipitation = d.rain.unwrap_or(0.0) + d.snow.unwrap_or(0.0);
                ForecastDay {
                    date: date.format("%Y-%m-%d").to_string(),
                    day: date.format("%a").to_string(),
                    temperature: d.temp.day,
                    temp_min: d.temp.min,
                    temp_max: d.temp.max,
                    feels_like: d.feels_like.day,
                    conditions: d
                        .weather
                        .first()
                        .map(|w| w.description.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                    humidity: d.humidity,
                    wind_speed: d.wind_speed,
                    pressure: d.pressure,
                    precipitation,
                    uvi: d.uvi.unwrap_or(0.0),
                    risk_score: daily_risk_score(
                        d.wind_speed,
                        precipitation,
                        d.temp.max,
                        d.temp.min,
                        d.humidity,
                    ),
                }
            })
            .collect();

        Ok(Forecast {
            forecast,
            source: "openweathermap".to_string(),
            last_updated: Utc::now(),
        })
    }

    async fn fetch_air_quality(&self, latitude: f64, longitude: f64) -> Result<AirQuality> {
        let response = self
            .client
            .get(AIR_POLLUTION_BASE)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .context("air quality request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("air quality API returned {}", response.status()));
        }
        let body: AirPollutionResponse =
            response.json().await.context("air quality body unparseable")?;
        let entry = body.list.first().ok_or_else(|| anyhow!("empty air quality payload"))?;

        let (level, color, description) = aqi_category(entry.main.aqi);
        Ok(AirQuality {
            aqi: entry.main.aqi,
            level: level.to_string(),
            color: color.to_string(),
            description: description.to_string(),
            components: entry.components.clone(),
            source: "openweathermap".to_string(),
            last_updated: Utc::now(),
        })
    }
}

/// Weather-driven risk for one forecast day, 0-10.
fn daily_risk_score(
    wind_speed: f64,
    precipitation: f64,
    temp_max: f64,
    temp_min: f64,
    humidity: f64,
) -> f64 {
    let mut risk: f64 = 0.0;

    if wind_speed > 25.0 {
        risk += 3.0;
    } else if wind_speed > 15.0 {
        risk += 1.5;
    }

    if precipitation > 50.0 {
        risk += 3.5;
    } else if precipitation > 20.0 {
        risk += 2.0;
    } else if precipitation > 5.0 {
        risk += 1.0;
    }

    if temp_max > 40.0 || temp_min < -10.0 {
        risk += 2.5;
    } else if temp_max > 35.0 || temp_min < 0.0 {
        risk += 1.5;
    }

    if humidity > 85.0 {
        risk += 1.0;
    }

    ((risk.min(10.0)) * 10.0).round() / 10.0
}

// ============================================================================
// FEED PAYLOADS
// ============================================================================

#[derive(Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    wind: OwmWind,
    visibility: Option<f64>,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct OwmWeather {
    description: String,
}

#[derive(Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    daily: Vec<OneCallDay>,
}

#[derive(Deserialize)]
struct OneCallDay {
    dt: i64,
    temp: OneCallTemp,
    feels_like: OneCallFeelsLike,
    humidity: f64,
    wind_speed: f64,
    pressure: f64,
    rain: Option<f64>,
    snow: Option<f64>,
    uvi: Option<f64>,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

#[derive(Deserialize)]
struct OneCallTemp {
    day: f64,
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct OneCallFeelsLike {
    day: f64,
}

#[derive(Deserialize)]
struct AirPollutionResponse {
    #[serde(default)]
    list: Vec<AirPollutionEntry>,
}

#[derive(Deserialize)]
struct AirPollutionEntry {
    main: AirPollutionMain,
    components: AqiComponents,
}

#[derive(Deserialize)]
struct AirPollutionMain {
    aqi: u8,
}

#[derive(Deserialize)]
struct UsgsResponse {
    #[serde(default)]
    features: Vec<UsgsFeature>,
}

#[derive(Deserialize)]
struct UsgsFeature {
    properties: UsgsProperties,
    geometry: UsgsGeometry,
}

#[derive(Deserialize)]
struct UsgsProperties {
    mag: Option<f64>,
    time: i64,
}

#[derive(Deserialize)]
struct UsgsGeometry {
    coordinates: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> ExternalDataService {
        let mut config = Config::from_env();
        config.openweather_api_key = DEMO_KEY.to_string();
        config.cache_ttl_secs = 300;
        config.cache_capacity = 16;
        ExternalDataService::new(&config)
    }

    #[tokio::test]
    async fn test_repeated_query_hits_cache() {
        let svc = offline_service();
        let first = svc.weather(37.7749, -122.4194).await;
        let second = svc.weather(37.7751, -122.4201).await; // rounds to same key
        assert_eq!(svc.feed_call_count(), 1);
        assert_eq!(first.temperature.to_bits(), second.temperature.to_bits());
    }

    #[tokio::test]
    async fn test_distinct_locations_fetch_separately() {
        let svc = offline_service();
        svc.weather(37.77, -122.42).await;
        svc.weather(40.71, -74.0).await;
        assert_eq!(svc.feed_call_count(), 2);
        assert_eq!(svc.cached_entries(), 2);
    }

    #[tokio::test]
    async fn test_weather_and_quake_caches_are_independent() {
        let svc = offline_service();
        svc.weather(37.77, -122.42).await;
        svc.earthquakes(37.77, -122.42, None).await;
        svc.earthquakes(37.77, -122.42, Some(250)).await; // different radius
        assert_eq!(svc.feed_call_count(), 3);
    }

    #[tokio::test]
    async fn test_offline_service_reports_mock_source() {
        let svc = offline_service();
        assert_eq!(svc.weather(10.0, 10.0).await.source, "mock");
        assert_eq!(svc.earthquakes(10.0, 10.0, None).await.source, "mock");
        assert_eq!(svc.forecast(10.0, 10.0, None).await.source, "mock");
        assert_eq!(svc.air_quality(10.0, 10.0).await.source, "mock");
    }

    #[tokio::test]
    async fn test_forecast_caches_per_day_count() {
        let svc = offline_service();
        let week = svc.forecast(37.77, -122.42, None).await;
        assert_eq!(week.forecast.len(), 7);

        // Same location and day count: served from cache.
        svc.forecast(37.77, -122.42, Some(7)).await;
        assert_eq!(svc.feed_call_count(), 1);

        // A different day count is a different key.
        let short = svc.forecast(37.77, -122.42, Some(3)).await;
        assert_eq!(short.forecast.len(), 3);
        assert_eq!(svc.feed_call_count(), 2);
    }

    #[tokio::test]
    async fn test_forecast_day_count_is_clamped() {
        let svc = offline_service();
        assert_eq!(svc.forecast(0.0, 0.0, Some(30)).await.forecast.len(), 7);
        assert_eq!(svc.forecast(0.0, 0.0, Some(0)).await.forecast.len(), 1);
    }

    #[tokio::test]
    async fn test_air_quality_is_cached() {
        let svc = offline_service();
        let first = svc.air_quality(37.77, -122.42).await;
        let second = svc.air_quality(37.7701, -122.4199).await;
        assert_eq!(svc.feed_call_count(), 1);
        assert_eq!(first.aqi, second.aqi);
    }

    #[test]
    fn test_daily_risk_score_tiers() {
        // Calm day.
        assert_eq!(daily_risk_score(5.0, 0.0, 22.0, 12.0, 50.0), 0.0);
        // Windy, wet, hot, humid: 3.0 + 3.5 + 2.5 + 1.0.
        assert_eq!(daily_risk_score(30.0, 60.0, 42.0, 20.0, 90.0), 10.0);
        // Mid tiers.
        assert_eq!(daily_risk_score(18.0, 10.0, 36.0, 5.0, 50.0), 4.0);
    }

    #[test]
    fn test_one_call_payload_parses() {
        let raw = serde_json::json!({
            "daily": [{
                "dt": 1_700_000_000i64,
                "temp": {"day": 18.2, "min": 11.0, "max": 21.5},
                "feels_like": {"day": 17.0},
                "humidity": 62.0,
                "wind_speed": 4.1,
                "pressure": 1015.0,
                "rain": 2.3,
                "uvi": 5.5,
                "weather": [{"description": "scattered clouds"}]
            }]
        });
        let parsed: OneCallResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.daily.len(), 1);
        assert_eq!(parsed.daily[0].temp.max, 21.5);
        assert_eq!(parsed.daily[0].snow, None);
    }

    #[test]
    fn test_usgs_payload_parses() {
        let raw = serde_json::json!({
            "features": [
                {"properties": {"mag": 4.2, "time": 1_700_000_000_000i64},
                 "geometry": {"coordinates": [-122.4, 37.7, 8.5]}},
                {"properties": {"mag": null, "time": 1_700_000_100_000i64},
                 "geometry": {"coordinates": [-122.5, 37.8, 11.5]}}
            ]
        });
        let parsed: UsgsResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.features.len(), 2);
        assert_eq!(parsed.features[0].properties.mag, Some(4.2));
        assert_eq!(parsed.features[1].geometry.coordinates[2], 11.5);
    }
}
