// src/config/cache.rs
// DOCUMENTATION: Tuning constants for the geo-query cache
// PURPOSE: Throttle thresholds, TTL and capacity, overridable from Config

use crate::config::Config;
use std::time::Duration;

/// Geo-query cache configuration
/// DOCUMENTATION: Injected into GeoQueryCache at construction
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCacheConfig {
    /// Validity window for a cached wide-radius search
    pub cache_ttl: Duration,
    /// Minimum time between provider calls regardless of movement
    pub min_query_interval: Duration,
    /// Displacement (meters) from the last query location that forces a refresh
    pub min_movement_threshold: f64,
    /// Radius (meters) of every actual provider call
    pub wide_search_radius: f64,
    /// Bound on provider initialization
    pub init_timeout: Duration,
    /// Cap on cached searches; oldest are evicted first
    pub max_entries: usize,
}

impl Default for GeoCacheConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5 * 60),
            min_query_interval: Duration::from_secs(60),
            min_movement_threshold: 500.0,
            wide_search_radius: 1000.0,
            init_timeout: Duration::from_secs(10),
            max_entries: 64,
        }
    }
}

impl From<&Config> for GeoCacheConfig {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
            min_query_interval: Duration::from_secs(config.min_query_interval_seconds),
            min_movement_threshold: config.min_movement_meters,
            wide_search_radius: config.wide_search_radius_meters,
            init_timeout: Duration::from_secs(config.provider_init_timeout_seconds),
            max_entries: config.cache_max_entries.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeoCacheConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.min_query_interval, Duration::from_secs(60));
        assert_eq!(config.min_movement_threshold, 500.0);
        assert_eq!(config.wide_search_radius, 1000.0);
        assert_eq!(config.init_timeout, Duration::from_secs(10));
    }
}
