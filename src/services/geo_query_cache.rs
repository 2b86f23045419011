// src/services/geo_query_cache.rs
// DOCUMENTATION: Wide-radius prefetch cache for nearby places
// PURPOSE: Decide when to query the provider, cache wide searches and
// serve narrow, distance-filtered views from the whole cache table

use crate::config::GeoCacheConfig;
use crate::errors::PlacesError;
use crate::models::{Coordinate, PlaceDetails, PlaceRecord};
use crate::services::{
    distance, post_filter_tags, to_provider_types, GeolocationProvider, PlacesProvider,
    PositionOptions, PostFilter,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// One cached provider search
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub records: Vec<PlaceRecord>,
    pub fetched_at: Instant,
}

/// Throttle bookkeeping, written right before each provider call
#[derive(Debug, Default, Clone, Copy)]
struct QueryState {
    last_query_time: Option<Instant>,
    last_query_location: Option<Coordinate>,
}

#[derive(Debug, Default)]
struct EngineState {
    entries: HashMap<String, CacheEntry>,
    query: QueryState,
    initialized: bool,
    provider_calls: u64,
}

/// Why a fresh provider search is issued
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshReason {
    FirstSearch,
    /// Meters moved since the last search
    MovedFarEnough(f64),
    /// Time since the last search
    IntervalElapsed(Duration),
}

/// Lifecycle of an engine relative to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No query ever made
    Cold,
    /// Valid entries exist and no refresh is due
    Warm,
    /// Entries all expired, or a refresh is due
    Stale,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Cold => "cold",
            CacheState::Warm => "warm",
            CacheState::Stale => "stale",
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    /// Records held across active entries (before dedupe)
    pub cached_places: usize,
    pub provider_calls: u64,
}

/// Geo-query cache/throttle engine
/// DOCUMENTATION: One instance per session, shared as Arc<GeoQueryCache>.
///
/// Every provider call uses `wide_search_radius`; callers ask for any
/// `view_radius` and get a filtered view of all still-valid entries.
/// Calls are serialized: the state lock is held across the provider round-trip,
/// so at most one search is in flight per engine.
pub struct GeoQueryCache {
    provider: Arc<dyn PlacesProvider>,
    config: GeoCacheConfig,
    state: Mutex<EngineState>,
}

impl GeoQueryCache {
    pub fn new(provider: Arc<dyn PlacesProvider>, config: GeoCacheConfig) -> Self {
        Self {
            provider,
            config,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Generate cache key from search parameters
    /// Coordinates are rounded to 3 decimals (~100m)
    pub fn cache_key(position: Coordinate, radius: f64, provider_types: &BTreeSet<String>) -> String {
        let types = if provider_types.is_empty() {
            "all".to_string()
        } else {
            provider_types.iter().cloned().collect::<Vec<_>>().join(",")
        };

        format!(
            "nearby:{}:{}:{}:{}",
            (position.latitude * 1000.0).round() as i64,
            (position.longitude * 1000.0).round() as i64,
            radius.round() as i64,
            types
        )
    }

    fn should_query(&self, query: &QueryState, position: Coordinate, now: Instant) -> Option<RefreshReason> {
        let Some(last_location) = query.last_query_location else {
            return Some(RefreshReason::FirstSearch);
        };

        let moved = distance(position, last_location);
        if moved >= self.config.min_movement_threshold {
            return Some(RefreshReason::MovedFarEnough(moved));
        }

        let elapsed = query
            .last_query_time
            .map(|t| now.duration_since(t))
            .unwrap_or(Duration::MAX);
        if elapsed > self.config.min_query_interval {
            return Some(RefreshReason::IntervalElapsed(elapsed));
        }

        None
    }

    fn is_valid(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.fetched_at) < self.config.cache_ttl
    }

    async fn ensure_initialized(&self, state: &mut EngineState) -> Result<(), PlacesError> {
        if state.initialized {
            return Ok(());
        }

        match tokio::time::timeout(self.config.init_timeout, self.provider.initialize()).await {
            Ok(Ok(())) => {
                state.initialized = true;
                Ok(())
            }
            Ok(Err(e)) => {
                log::error!("Places provider failed to initialize: {}", e);
                Err(match e {
                    PlacesError::ProviderUnavailable(_) => e,
                    other => PlacesError::ProviderUnavailable(other.to_string()),
                })
            }
            Err(_) => {
                log::error!(
                    "Places provider did not initialize within {}s",
                    self.config.init_timeout.as_secs()
                );
                Err(PlacesError::ProviderUnavailable(format!(
                    "initialization timed out after {}s",
                    self.config.init_timeout.as_secs()
                )))
            }
        }
    }

    /// Nearby places within `view_radius` meters of `position`
    /// DOCUMENTATION: Main entry point for the presentation layer
    ///
    /// 1. Resolve interests to provider types
    /// 2. Refresh from the provider if first search, moved far enough, or interval elapsed
    /// 3. Filter every valid cache entry by distance, type and price tags
    /// 4. Dedupe by place id and sort by distance
    ///
    /// Provider search failures yield an empty refresh, never an error.
    /// Only initialization failures and invalid input are returned as errors.
    pub async fn get_places(
        &self,
        position: Coordinate,
        view_radius: f64,
        interests: &BTreeSet<String>,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        if !position.is_valid() {
            return Err(PlacesError::InvalidInput(format!(
                "invalid position {},{}",
                position.latitude, position.longitude
            )));
        }
        if !view_radius.is_finite() || view_radius < 0.0 {
            return Err(PlacesError::InvalidInput(format!(
                "invalid view radius {}",
                view_radius
            )));
        }

        let provider_types = to_provider_types(interests);
        let post_filters = post_filter_tags(interests);

        let mut state = self.state.lock().await;
        self.ensure_initialized(&mut state).await?;

        let now = Instant::now();
        match self.should_query(&state.query, position, now) {
            Some(reason) => {
                log::info!("Refreshing nearby places: {:?}", reason);
                self.refresh(&mut state, position, &provider_types).await;
            }
            None => log::debug!("Query throttled - serving from cache"),
        }

        let places = self.serve(
            &state,
            position,
            view_radius,
            &provider_types,
            &post_filters,
            Instant::now(),
        );

        log::debug!(
            "Serving {} places within {}m of {},{}",
            places.len(),
            view_radius,
            position.latitude,
            position.longitude
        );

        Ok(places)
    }

    async fn refresh(&self, state: &mut EngineState, position: Coordinate, provider_types: &BTreeSet<String>) {
        let radius = self.config.wide_search_radius;
        let key = Self::cache_key(position, radius, provider_types);

        // Counted before the call so a failing provider is still throttled
        state.query.last_query_time = Some(Instant::now());
        state.query.last_query_location = Some(position);
        state.provider_calls += 1;

        let type_filter = (!provider_types.is_empty()).then_some(provider_types);
        let records: Vec<PlaceRecord> = match self.provider.search(position, radius, type_filter).await {
            Ok(raw_places) => raw_places
                .into_iter()
                .map(|raw| PlaceRecord::from_raw(raw, position))
                .collect(),
            Err(e) => {
                log::warn!("Nearby search failed, caching empty result: {}", e);
                Vec::new()
            }
        };

        log::info!("Cached {} places under {}", records.len(), key);

        self.insert_entry(
            state,
            CacheEntry {
                key,
                records,
                fetched_at: Instant::now(),
            },
        );
    }

    fn insert_entry(&self, state: &mut EngineState, entry: CacheEntry) {
        if !state.entries.contains_key(&entry.key) {
            let now = entry.fetched_at;
            if state.entries.len() >= self.config.max_entries {
                state.entries.retain(|_, e| self.is_valid(e, now));
            }

            while state.entries.len() >= self.config.max_entries {
                let oldest = state
                    .entries
                    .values()
                    .min_by_key(|e| e.fetched_at)
                    .map(|e| e.key.clone());

                match oldest {
                    Some(key) => {
                        log::debug!("Cache full, evicting {}", key);
                        state.entries.remove(&key);
                    }
                    None => break,
                }
            }
        }

        state.entries.insert(entry.key.clone(), entry);
    }

    fn serve(
        &self,
        state: &EngineState,
        position: Coordinate,
        view_radius: f64,
        provider_types: &BTreeSet<String>,
        post_filters: &[PostFilter],
        now: Instant,
    ) -> Vec<PlaceRecord> {
        // Freshest entry first, so its copy of a duplicated place wins
        let mut entries: Vec<&CacheEntry> = state
            .entries
            .values()
            .filter(|e| self.is_valid(e, now))
            .collect();
        entries.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));

        let mut seen = HashSet::new();
        let mut places = Vec::new();

        for record in entries.iter().flat_map(|e| e.records.iter()) {
            if !record.matches_any(provider_types) {
                continue;
            }

            let meters = distance(position, record.location);
            if !(meters <= view_radius) {
                continue;
            }

            if !post_filters.iter().all(|f| f.accepts(record)) {
                continue;
            }

            if !seen.insert(record.id.as_str()) {
                continue;
            }

            let mut place = record.clone();
            place.distance_from_query_origin = meters;
            places.push(place);
        }

        places.sort_by(|a, b| {
            a.distance_from_query_origin
                .partial_cmp(&b.distance_from_query_origin)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        places
    }

    /// Details for one place, straight from the provider
    /// DOCUMENTATION: Initializes the provider if needed; results are not cached
    /// and do not touch the throttle state
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Err(PlacesError::InvalidInput("empty place id".to_string()));
        }

        {
            let mut state = self.state.lock().await;
            self.ensure_initialized(&mut state).await?;
        }

        self.provider.details(place_id).await
    }

    /// Current position from `geolocation`, then get_places around it
    /// Geolocation failures are returned to the caller
    pub async fn discover_around(
        &self,
        geolocation: &dyn GeolocationProvider,
        options: &PositionOptions,
        view_radius: f64,
        interests: &BTreeSet<String>,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        let position = geolocation.current_position(options).await?;
        self.get_places(position, view_radius, interests).await
    }

    /// Engine state as seen from `position`
    pub async fn state_at(&self, position: Coordinate) -> CacheState {
        let state = self.state.lock().await;
        let now = Instant::now();

        if state.query.last_query_location.is_none() && state.entries.is_empty() {
            return CacheState::Cold;
        }

        let any_valid = state.entries.values().any(|e| self.is_valid(e, now));
        if !any_valid || self.should_query(&state.query, position, now).is_some() {
            CacheState::Stale
        } else {
            CacheState::Warm
        }
    }

    /// Clear expired entries
    /// Returns the number removed
    pub async fn sweep(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let before_count = state.entries.len();
        state.entries.retain(|_, entry| self.is_valid(entry, now));
        let removed = before_count - state.entries.len();

        if removed > 0 {
            log::info!(
                "Cache sweep: removed {} expired entries ({} remaining)",
                removed,
                state.entries.len()
            );
        }

        removed
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let now = Instant::now();

        let active: Vec<&CacheEntry> = state
            .entries
            .values()
            .filter(|e| self.is_valid(e, now))
            .collect();

        CacheStats {
            total_entries: state.entries.len(),
            expired_entries: state.entries.len() - active.len(),
            active_entries: active.len(),
            cached_places: active.iter().map(|e| e.records.len()).sum(),
            provider_calls: state.provider_calls,
        }
    }
}

/// Start background sweep task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_sweep_task(cache: Arc<GeoQueryCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            cache.sweep().await;
        }
    })
}
