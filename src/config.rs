//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// OpenWeatherMap API key ("demo_key" routes all fetches to the mock
    /// generators)
    pub openweather_api_key: String,

    /// Directory holding persisted model artifacts
    pub model_dir: String,

    /// Synthetic training set size
    pub training_samples: usize,

    /// External feed cache TTL in seconds
    pub cache_ttl_secs: u64,

    /// External feed cache capacity (entries per feed)
    pub cache_capacity: usize,

    /// Outbound HTTP timeout in seconds
    pub external_timeout_secs: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .unwrap_or_else(|_| "demo_key".to_string()),

            model_dir: env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string()),

            training_samples: env::var("TRAINING_SAMPLES")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(8000),

            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),

            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),

            external_timeout_secs: env::var("EXTERNAL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_production_matches_environment() {
        let mut config = Config::from_env();
        config.environment = "production".to_string();
        assert!(config.is_production());
        config.environment = "development".to_string();
        assert!(!config.is_production());
    }
}
