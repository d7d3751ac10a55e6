//! Mock feed generators
//!
//! Substitute for the live OpenWeatherMap/USGS feeds whenever no real API
//! key is configured or a fetch fails. Output is location-plausible rather
//! than accurate; `source` marks it as mock data.

use chrono::{Datelike, Days, Utc};
use rand::Rng;

use crate::engine::synth::{exponential, normal};
use crate::models::weather::{
    aqi_category, AirQuality, AqiComponents, Forecast, ForecastDay, QuakeSummary, WeatherReport,
};

const CONDITIONS: [&str; 8] = [
    "clear sky",
    "partly cloudy",
    "overcast",
    "light rain",
    "moderate rain",
    "fog",
    "mist",
    "sunny",
];

/// Latitude-driven climate sketch: warm at the equator, seasonal swing
/// peaking ~80 days after new year.
pub fn mock_weather<R: Rng>(rng: &mut R, latitude: f64, _longitude: f64) -> WeatherReport {
    let day_of_year = Utc::now().ordinal() as f64;
    let base_temp = 15.0 + 20.0 * latitude.abs().to_radians().cos();
    let season = ((day_of_year - 80.0) * 2.0 * std::f64::consts::PI / 365.0).sin();
    let temperature = base_temp + season * 10.0 + normal(rng, 0.0, 3.0);

    WeatherReport {
        temperature: (temperature * 10.0).round() / 10.0,
        conditions: CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string(),
        humidity: (45 + rng.gen_range(0..35)) as f64,
        wind_speed: ((3.0 + exponential(rng, 5.0)) * 10.0).round() / 10.0,
        pressure: (1013.0 + normal(rng, 0.0, 15.0)).round(),
        visibility: ((8.0 + rng.gen_range(0.0..2.0f64)) * 10.0).round() / 10.0,
        source: "mock".to_string(),
        last_updated: Utc::now(),
    }
}

const FORECAST_CONDITIONS: [&str; 4] = ["Clear Sky", "Partly Cloudy", "Cloudy", "Light Rain"];

/// Day-by-day forecast around a latitude-driven base temperature.
pub fn mock_forecast<R: Rng>(rng: &mut R, latitude: f64, days: usize) -> Forecast {
    let today = Utc::now().date_naive();
    let base_temp = 20.0 - latitude.abs() * 0.5;

    let forecast = (0..days as u64)
        .map(|offset| {
            let date = today + Days::new(offset);
            let temperature = round1(base_temp + rng.gen_range(-3.0..3.0));
            ForecastDay {
                date: date.format("%Y-%m-%d").to_string(),
                day: date.format("%a").to_string(),
                temperature,
                temp_min: round1(temperature - 3.0),
                temp_max: round1(temperature + 5.0),
                feels_like: round1(temperature - 1.0),
                conditions: FORECAST_CONDITIONS[rng.gen_range(0..FORECAST_CONDITIONS.len())]
                    .to_string(),
                humidity: rng.gen_range(40..=80) as f64,
                wind_speed: round1(rng.gen_range(5.0..20.0)),
                pressure: round1(1013.0 + rng.gen_range(-10.0..10.0)),
                precipitation: round1(rng.gen_range(0.0..15.0)),
                uvi: round1(rng.gen_range(0.0..8.0)),
                risk_score: round1(rng.gen_range(2.0..8.0)),
            }
        })
        .collect();

    Forecast { forecast, source: "mock".to_string(), last_updated: Utc::now() }
}

/// AQI sketch: the 20-40 degree urban belts skew one category worse.
pub fn mock_air_quality<R: Rng>(rng: &mut R, latitude: f64) -> AirQuality {
    let mut aqi: u8 = rng.gen_range(1..=3);
    if (20.0..=40.0).contains(&latitude.abs()) {
        aqi = (aqi + 1).min(5);
    }
    let (level, color, description) = aqi_category(aqi);

    let pm2_5 = if aqi >= 3 {
        round2(rng.gen_range(5.0..150.0))
    } else {
        round2(rng.gen_range(0.0..50.0))
    };

    AirQuality {
        aqi,
        level: level.to_string(),
        color: color.to_string(),
        description: description.to_string(),
        components: AqiComponents {
            pm2_5,
            pm10: round2(pm2_5 * 1.5 + rng.gen_range(0.0..20.0)),
            no2: round2(rng.gen_range(10.0..100.0)),
            o3: round2(rng.gen_range(30.0..120.0)),
            so2: round2(rng.gen_range(5.0..50.0)),
            co: round2(rng.gen_range(200.0..1000.0)),
        },
        source: "mock".to_string(),
        last_updated: Utc::now(),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn mock_quakes<R: Rng>(rng: &mut R) -> QuakeSummary {
    QuakeSummary {
        count: poisson(rng, 5.0),
        max_magnitude: 2.0 + exponential(rng, 2.0),
        recent_count_7d: poisson(rng, 1.0),
        average_depth: 10.0 + exponential(rng, 15.0),
        source: "mock".to_string(),
        last_updated: Utc::now(),
    }
}

/// Knuth's product method; fine for the small lambdas used here.
fn poisson<R: Rng>(rng: &mut R, lambda: f64) -> u32 {
    let limit = (-lambda).exp();
    let mut k = 0u32;
    let mut p = 1.0;
    loop {
        p *= rng.gen_range(0.0..1.0f64);
        if p <= limit {
            return k;
        }
        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_mock_weather_is_plausible() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for lat in [-60.0, 0.0, 37.77, 65.0] {
            let w = mock_weather(&mut rng, lat, 10.0);
            assert!(w.temperature > -40.0 && w.temperature < 60.0);
            assert!((45.0..80.0).contains(&w.humidity));
            assert!(w.wind_speed >= 3.0);
            assert!((900.0..1100.0).contains(&w.pressure));
            assert!((8.0..=10.0).contains(&w.visibility));
            assert_eq!(w.source, "mock");
        }
    }

    #[test]
    fn test_mock_weather_warmer_at_equator() {
        // Average out the noise over repeated draws.
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mean = |rng: &mut ChaCha8Rng, lat: f64| -> f64 {
            (0..200).map(|_| mock_weather(rng, lat, 0.0).temperature).sum::<f64>() / 200.0
        };
        assert!(mean(&mut rng, 0.0) > mean(&mut rng, 60.0) + 5.0);
    }

    #[test]
    fn test_mock_forecast_shape_and_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let f = mock_forecast(&mut rng, 37.77, 7);
        assert_eq!(f.forecast.len(), 7);
        assert_eq!(f.source, "mock");
        for day in &f.forecast {
            assert!(day.temp_min < day.temp_max);
            assert!((40.0..=80.0).contains(&day.humidity));
            assert!((2.0..=8.0).contains(&day.risk_score));
            assert!(FORECAST_CONDITIONS.contains(&day.conditions.as_str()));
        }
        // Dates are consecutive starting today.
        assert_eq!(f.forecast[0].date, Utc::now().date_naive().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_mock_forecast_respects_day_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        assert_eq!(mock_forecast(&mut rng, 0.0, 3).forecast.len(), 3);
        assert_eq!(mock_forecast(&mut rng, 0.0, 1).forecast.len(), 1);
    }

    #[test]
    fn test_mock_air_quality_category_is_consistent() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for lat in [0.0, 30.0, -35.0, 60.0] {
            let aq = mock_air_quality(&mut rng, lat);
            assert!((1..=5).contains(&aq.aqi));
            let (level, color, _) = aqi_category(aq.aqi);
            assert_eq!(aq.level, level);
            assert_eq!(aq.color, color);
            assert!(aq.components.pm10 >= aq.components.pm2_5);
            assert_eq!(aq.source, "mock");
        }
    }

    #[test]
    fn test_mock_quakes_is_plausible() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let q = mock_quakes(&mut rng);
            assert!(q.max_magnitude >= 2.0);
            assert!(q.average_depth >= 10.0);
            assert_eq!(q.source, "mock");
        }
    }

    #[test]
    fn test_poisson_mean_near_lambda() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 2000;
        let total: u64 = (0..n).map(|_| poisson(&mut rng, 5.0) as u64).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 5.0).abs() < 0.3, "mean was {mean}");
    }

    #[test]
    fn test_seeded_rng_reproduces() {
        let a = mock_quakes(&mut ChaCha8Rng::seed_from_u64(9));
        let b = mock_quakes(&mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a.count, b.count);
        assert_eq!(a.max_magnitude.to_bits(), b.max_magnitude.to_bits());
    }
}
