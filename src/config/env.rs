// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Google Places API Key
    pub google_places_api_key: String,

    /// How long a cached wide-radius search stays valid
    pub cache_ttl_seconds: u64,

    /// Minimum time between provider calls when the user has not moved far
    pub min_query_interval_seconds: u64,

    /// Displacement that forces a fresh provider call
    pub min_movement_meters: f64,

    /// Radius used for every provider call
    pub wide_search_radius_meters: f64,

    /// Upper bound on cached searches held in memory
    pub cache_max_entries: usize,

    /// Interval of the background expired-entry sweep
    pub cache_sweep_interval_seconds: u64,

    /// Upper bound on provider initialization
    pub provider_init_timeout_seconds: u64,
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 8003),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default(),
            cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS", 300),
            min_query_interval_seconds: parse_var("MIN_QUERY_INTERVAL_SECONDS", 60),
            min_movement_meters: parse_var("MIN_MOVEMENT_METERS", 500.0),
            wide_search_radius_meters: parse_var("WIDE_SEARCH_RADIUS_METERS", 1000.0),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", 64),
            cache_sweep_interval_seconds: parse_var("CACHE_SWEEP_INTERVAL_SECONDS", 60),
            provider_init_timeout_seconds: parse_var("PROVIDER_INIT_TIMEOUT_SECONDS", 10),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.wide_search_radius_meters <= 0.0 {
            return Err("WIDE_SEARCH_RADIUS_METERS must be positive".to_string());
        }

        if self.min_movement_meters < 0.0 {
            return Err("MIN_MOVEMENT_METERS must not be negative".to_string());
        }

        if self.cache_max_entries == 0 {
            return Err("CACHE_MAX_ENTRIES must be at least 1".to_string());
        }

        if self.cache_sweep_interval_seconds == 0 {
            return Err("CACHE_SWEEP_INTERVAL_SECONDS must be at least 1".to_string());
        }

        if self.google_places_api_key.is_empty() {
            log::warn!("GOOGLE_PLACES_API_KEY not configured - nearby search will be unavailable");
        }

        Ok(())
    }
}
