// src/models/place.rs
// DOCUMENTATION: Core data structures for discovered places
// PURPOSE: Provider records, normalized cache records and nearby-search DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

use super::Coordinate;

/// Search record as returned by a places provider
/// DOCUMENTATION: Provider-neutral shape; normalized into PlaceRecord by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlace {
    /// Provider-assigned unique identifier
    pub id: String,
    pub name: String,
    /// Provider category tags (e.g., ["cafe", "food", "point_of_interest"])
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub location: Coordinate,
    /// Price level (0-4: free to very expensive)
    pub price_level: Option<i32>,
    /// Short address
    pub vicinity: Option<String>,
}

/// Normalized place served to callers
/// DOCUMENTATION: Copies of cache-owned data; distance is relative to the caller's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub categories: BTreeSet<String>,
    /// 0 when the provider has no rating
    pub rating: f64,
    pub location: Coordinate,
    /// Meters from the position of the request that produced this copy
    pub distance_from_query_origin: f64,
    pub price_level: Option<i32>,
    pub vicinity: Option<String>,
}

impl PlaceRecord {
    /// Normalize a provider record relative to `origin`
    pub fn from_raw(raw: RawPlace, origin: Coordinate) -> Self {
        let distance = crate::services::distance(origin, raw.location);

        Self {
            id: raw.id,
            name: raw.name,
            categories: raw.types.into_iter().collect(),
            rating: raw.rating.unwrap_or(0.0),
            location: raw.location,
            distance_from_query_origin: distance,
            price_level: raw.price_level,
            vicinity: raw.vicinity,
        }
    }

    /// Whether this place carries at least one of `types`
    /// An empty filter matches everything
    pub fn matches_any(&self, types: &BTreeSet<String>) -> bool {
        types.is_empty() || self.categories.iter().any(|c| types.contains(c))
    }
}

/// Query parameters for GET /places/nearby
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    /// Viewing radius in meters (default 150)
    #[validate(range(min = 1.0, max = 50000.0))]
    pub radius: Option<f64>,

    /// Comma-separated interest tags
    pub interests: Option<String>,
}

impl NearbyQuery {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn view_radius(&self) -> f64 {
        self.radius.unwrap_or(150.0)
    }

    pub fn interest_set(&self) -> BTreeSet<String> {
        self.interests
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Response for GET /places/nearby
#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub places: Vec<NearbyPlaceResponse>,
    pub count: usize,
    /// Engine state after serving the request (cold, warm, stale)
    pub state: String,
}

/// Place as rendered for the presentation layer
#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyPlaceResponse {
    pub place_id: String,
    pub name: String,
    pub types: Vec<String>,
    /// Human-readable category label
    pub type_label: String,
    pub rating: f64,
    pub lat: f64,
    pub lng: f64,
    pub distance: f64,
    pub distance_text: String,
    pub price_level: Option<i32>,
    pub vicinity: Option<String>,
}

impl From<PlaceRecord> for NearbyPlaceResponse {
    fn from(record: PlaceRecord) -> Self {
        let types: Vec<String> = record.categories.into_iter().collect();

        Self {
            place_id: record.id,
            type_label: crate::services::display_label(&types),
            name: record.name,
            types,
            rating: record.rating,
            lat: record.location.latitude,
            lng: record.location.longitude,
            distance_text: crate::services::format_distance(record.distance_from_query_origin),
            distance: record.distance_from_query_origin,
            price_level: record.price_level,
            vicinity: record.vicinity,
        }
    }
}

/// Details for a single place, fetched on demand and never cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub id: String,
    pub name: String,
    /// Full postal address
    pub address: Option<String>,
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub price_level: Option<i32>,
    pub location: Option<Coordinate>,
    pub open_now: Option<bool>,
    /// Opening hours per weekday (e.g., "Monday: 9:00 AM - 5:00 PM")
    pub opening_hours: Vec<String>,
}

/// Response for GET /places/{place_id}
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceDetailsResponse {
    pub place_id: String,
    pub name: String,
    pub type_label: String,
    pub types: Vec<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub price_level: Option<i32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub open_now: Option<bool>,
    pub opening_hours: Vec<String>,
}

impl From<PlaceDetails> for PlaceDetailsResponse {
    fn from(details: PlaceDetails) -> Self {
        Self {
            place_id: details.id,
            name: details.name,
            type_label: crate::services::display_label(&details.types),
            types: details.types,
            address: details.address,
            rating: details.rating,
            price_level: details.price_level,
            lat: details.location.map(|c| c.latitude),
            lng: details.location.map(|c| c.longitude),
            open_now: details.open_now,
            opening_hours: details.opening_hours,
        }
    }
}
