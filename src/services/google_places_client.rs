// src/services/google_places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: PlacesProvider implementation backed by the Nearby Search REST endpoint

use crate::errors::PlacesError;
use crate::models::{Coordinate, PlaceDetails, RawPlace};
use crate::services::PlacesProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DETAILS_FIELDS: &str =
    "place_id,name,formatted_address,geometry,rating,types,price_level,opening_hours";

/// Google Places API client
/// DOCUMENTATION: Handles authentication and API calls to Google Places
pub struct GooglePlacesClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Places API key
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
}

/// Response from Google Places Nearby Search
#[derive(Debug, Deserialize, Serialize)]
pub struct GooglePlacesResponse {
    /// Results array from API
    #[serde(default)]
    pub results: Vec<GooglePlace>,
    /// Status of the API call
    pub status: String,
    /// Error message (if status is not OK)
    pub error_message: Option<String>,
}

/// Individual place from Google Places API
/// DOCUMENTATION: Subset of the Nearby Search result the engine uses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePlace {
    /// Google's unique place identifier
    pub place_id: String,
    pub name: String,
    /// Place types array (e.g., ["restaurant", "food", "point_of_interest"])
    #[serde(default)]
    pub types: Vec<String>,
    pub geometry: Option<GoogleGeometry>,
    /// Short address
    pub vicinity: Option<String>,
    /// Rating (0-5)
    pub rating: Option<f64>,
    /// Price level (0-4: free to very expensive)
    pub price_level: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleGeometry {
    pub location: GoogleLocation,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Response from Google Place Details
#[derive(Debug, Deserialize, Serialize)]
pub struct GooglePlaceDetailsResponse {
    pub result: Option<GooglePlaceDetails>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Place Details result, limited to DETAILS_FIELDS
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePlaceDetails {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub geometry: Option<GoogleGeometry>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub types: Vec<String>,
    pub price_level: Option<i32>,
    pub opening_hours: Option<GoogleOpeningHours>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleOpeningHours {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

impl From<GooglePlaceDetails> for PlaceDetails {
    fn from(details: GooglePlaceDetails) -> Self {
        let (open_now, opening_hours) = match details.opening_hours {
            Some(hours) => (hours.open_now, hours.weekday_text),
            None => (None, Vec::new()),
        };

        PlaceDetails {
            id: details.place_id,
            name: details.name,
            address: details.formatted_address,
            types: details.types,
            rating: details.rating,
            price_level: details.price_level,
            location: details
                .geometry
                .map(|g| Coordinate::new(g.location.lat, g.location.lng)),
            open_now,
            opening_hours,
        }
    }
}

impl From<GooglePlace> for RawPlace {
    fn from(place: GooglePlace) -> Self {
        // Missing geometry falls back to (0, 0); the radius filter drops it
        let location = place
            .geometry
            .map(|g| Coordinate::new(g.location.lat, g.location.lng))
            .unwrap_or(Coordinate::new(0.0, 0.0));

        RawPlace {
            id: place.place_id,
            name: place.name,
            types: place.types,
            rating: place.rating,
            location,
            price_level: place.price_level,
            vicinity: place.vicinity,
        }
    }
}

impl GooglePlacesClient {
    /// Create new Google Places API client
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create client against a custom endpoint (proxies, test doubles)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Nearby Search requests needed for a type filter
    /// DOCUMENTATION: The endpoint takes a single `type`, so a filter with
    /// several types fans out into one request per type
    fn search_types(type_filter: Option<&BTreeSet<String>>) -> Vec<Option<&str>> {
        match type_filter {
            Some(types) if !types.is_empty() => types.iter().map(|t| Some(t.as_str())).collect(),
            _ => vec![None],
        }
    }

    /// Concatenate per-type batches, keeping the first copy of each place_id
    fn merge_by_place_id(batches: Vec<Vec<RawPlace>>) -> Vec<RawPlace> {
        let mut seen = HashSet::new();
        batches
            .into_iter()
            .flatten()
            .filter(|place| seen.insert(place.id.clone()))
            .collect()
    }

    /// Map a decoded API response to provider records
    fn interpret_response(api_response: GooglePlacesResponse) -> Result<Vec<RawPlace>, PlacesError> {
        match api_response.status.as_str() {
            "OK" | "ZERO_RESULTS" => {
                log::info!(
                    "Google Places search returned {} results",
                    api_response.results.len()
                );
                Ok(api_response.results.into_iter().map(RawPlace::from).collect())
            }
            "OVER_QUERY_LIMIT" => {
                log::error!("Google Places API quota exceeded");
                Err(PlacesError::RateLimitExceeded)
            }
            other => {
                let msg = match api_response.error_message {
                    Some(message) => format!("{}: {}", other, message),
                    None => other.to_string(),
                };
                log::warn!("Google Places API returned status {}", msg);
                Err(PlacesError::ProviderQueryFailed(msg))
            }
        }
    }

    /// Perform nearby search for places
    ///
    /// # Arguments
    /// * `center` - Search center
    /// * `radius` - Search radius in meters (max 50000)
    /// * `place_type` - Optional type filter (e.g., "restaurant", "cafe")
    pub async fn nearby_search(
        &self,
        center: Coordinate,
        radius: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<RawPlace>, PlacesError> {
        let url = format!("{}/nearbysearch/json", self.base_url);

        let mut params = HashMap::new();
        params.insert("location", format!("{},{}", center.latitude, center.longitude));
        params.insert("radius", radius.to_string());
        params.insert("key", self.api_key.clone());

        if let Some(pt) = place_type {
            params.insert("type", pt.to_string());
        }

        log::debug!(
            "Google Places nearby search: lat={}, lng={}, radius={}, type={:?}",
            center.latitude,
            center.longitude,
            radius,
            place_type
        );

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                log::error!("Google Places API request failed: {}", e);
                PlacesError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Google Places API error {}: {}", status, body);
            return Err(PlacesError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let api_response: GooglePlacesResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse Google Places response: {}", e);
            PlacesError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        Self::interpret_response(api_response)
    }

    /// Map a decoded Place Details response
    fn interpret_details(
        place_id: &str,
        api_response: GooglePlaceDetailsResponse,
    ) -> Result<PlaceDetails, PlacesError> {
        match (api_response.status.as_str(), api_response.result) {
            ("OK", Some(result)) => Ok(result.into()),
            ("OK", None) | ("NOT_FOUND", _) | ("ZERO_RESULTS", _) | ("INVALID_REQUEST", _) => {
                log::debug!("Google Places has no details for {}", place_id);
                Err(PlacesError::PlaceNotFound(place_id.to_string()))
            }
            ("OVER_QUERY_LIMIT", _) => {
                log::error!("Google Places API quota exceeded");
                Err(PlacesError::RateLimitExceeded)
            }
            (other, _) => {
                let msg = match api_response.error_message {
                    Some(message) => format!("{}: {}", other, message),
                    None => other.to_string(),
                };
                log::warn!("Google Places details returned status {}", msg);
                Err(PlacesError::ProviderQueryFailed(msg))
            }
        }
    }

    /// Get detailed information about a specific place
    ///
    /// # Arguments
    /// * `place_id` - Google Place ID
    pub async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = format!("{}/details/json", self.base_url);

        let params = [
            ("place_id", place_id),
            ("fields", DETAILS_FIELDS),
            ("key", self.api_key.as_str()),
        ];

        log::debug!("Google Places details lookup: place_id={}", place_id);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                log::error!("Google Places details request failed: {}", e);
                PlacesError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("Google Places details error {}", status);
            return Err(PlacesError::ExternalApiError(format!(
                "Details request failed: {}",
                status
            )));
        }

        let api_response: GooglePlaceDetailsResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse Google Places details: {}", e);
            PlacesError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        Self::interpret_details(place_id, api_response)
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn initialize(&self) -> Result<(), PlacesError> {
        if self.api_key.trim().is_empty() {
            return Err(PlacesError::ProviderUnavailable(
                "GOOGLE_PLACES_API_KEY not configured".to_string(),
            ));
        }

        log::info!("Google Places client ready ({})", self.base_url);
        Ok(())
    }

    async fn search(
        &self,
        center: Coordinate,
        radius_meters: f64,
        type_filter: Option<&BTreeSet<String>>,
    ) -> Result<Vec<RawPlace>, PlacesError> {
        let radius = radius_meters.round().clamp(1.0, 50_000.0) as u32;

        let mut batches = Vec::new();
        let mut last_error = None;
        for place_type in Self::search_types(type_filter) {
            match self.nearby_search(center, radius, place_type).await {
                Ok(places) => batches.push(places),
                Err(e) => {
                    log::warn!("Nearby search for type {:?} failed: {}", place_type, e);
                    last_error = Some(e);
                }
            }
        }

        // Err only when every request failed
        match last_error {
            Some(e) if batches.is_empty() => Err(e),
            _ => Ok(Self::merge_by_place_id(batches)),
        }
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.get_place_details(place_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn google_place(id: &str, lat: f64, lng: f64) -> GooglePlace {
        GooglePlace {
            place_id: id.to_string(),
            name: format!("Place {}", id),
            types: vec!["cafe".to_string(), "food".to_string()],
            geometry: Some(GoogleGeometry {
                location: GoogleLocation { lat, lng },
            }),
            vicinity: Some("Calle Alfonso I, Zaragoza".to_string()),
            rating: Some(4.5),
            price_level: Some(2),
        }
    }

    #[test]
    fn test_to_raw_place() {
        let raw = RawPlace::from(google_place("ChIJ123", 41.6536, -0.8790));

        assert_eq!(raw.id, "ChIJ123");
        assert_eq!(raw.location, Coordinate::new(41.6536, -0.8790));
        assert_eq!(raw.rating, Some(4.5));
        assert_eq!(raw.price_level, Some(2));
    }

    #[test]
    fn test_interpret_ok_and_zero_results() {
        let ok = GooglePlacesResponse {
            results: vec![google_place("a", 0.0, 0.0), google_place("b", 0.0, 0.0)],
            status: "OK".to_string(),
            error_message: None,
        };
        assert_eq!(GooglePlacesClient::interpret_response(ok).map(|r| r.len()), Ok(2));

        let empty = GooglePlacesResponse {
            results: vec![],
            status: "ZERO_RESULTS".to_string(),
            error_message: None,
        };
        assert_eq!(GooglePlacesClient::interpret_response(empty), Ok(vec![]));
    }

    #[test]
    fn test_interpret_failure_statuses() {
        let denied = GooglePlacesResponse {
            results: vec![],
            status: "REQUEST_DENIED".to_string(),
            error_message: Some("The provided API key is invalid.".to_string()),
        };
        assert!(matches!(
            GooglePlacesClient::interpret_response(denied),
            Err(PlacesError::ProviderQueryFailed(_))
        ));

        let quota = GooglePlacesResponse {
            results: vec![],
            status: "OVER_QUERY_LIMIT".to_string(),
            error_message: None,
        };
        assert_eq!(
            GooglePlacesClient::interpret_response(quota),
            Err(PlacesError::RateLimitExceeded)
        );
    }

    #[test]
    fn test_search_types_fan_out() {
        let two: BTreeSet<String> = ["bar".to_string(), "cafe".to_string()]
            .into_iter()
            .collect();

        assert_eq!(
            GooglePlacesClient::search_types(Some(&two)),
            vec![Some("bar"), Some("cafe")]
        );
        assert_eq!(GooglePlacesClient::search_types(Some(&BTreeSet::new())), vec![None]);
        assert_eq!(GooglePlacesClient::search_types(None), vec![None]);
    }

    #[test]
    fn test_merge_keeps_first_copy_of_each_place() {
        let bars = vec![RawPlace::from(google_place("a", 0.0, 0.0))];
        let cafes = vec![
            RawPlace::from(google_place("b", 0.0, 0.0)),
            RawPlace::from(google_place("a", 1.0, 1.0)),
        ];

        let merged = GooglePlacesClient::merge_by_place_id(vec![bars, cafes]);
        let ids: Vec<&str> = merged.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(merged[0].location, Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn test_decode_response_json() {
        let body = r#"{
            "results": [{
                "place_id": "xyz",
                "name": "Panaderia",
                "types": ["bakery", "food"],
                "geometry": {"location": {"lat": 41.65, "lng": -0.88}},
                "vicinity": "Plaza del Pilar"
            }],
            "status": "OK"
        }"#;

        let response: GooglePlacesResponse = serde_json::from_str(body).unwrap();
        let places = GooglePlacesClient::interpret_response(response).unwrap();
        assert_eq!(places[0].rating, None);
        assert_eq!(places[0].types, vec!["bakery", "food"]);
    }

    #[tokio::test]
    async fn test_initialize_requires_api_key() {
        let client = GooglePlacesClient::new(String::new());
        tokio_test::assert_err!(client.initialize().await);

        let client = GooglePlacesClient::new("test_key".to_string());
        tokio_test::assert_ok!(client.initialize().await);
    }

    fn result_json(id: &str) -> serde_json::Value {
        json!({
            "place_id": id,
            "name": format!("Place {}", id),
            "types": ["cafe", "bakery", "food"],
            "geometry": {"location": {"lat": 41.6500, "lng": -0.8800}},
            "vicinity": "Calle Don Jaime I"
        })
    }

    fn search_body(ids: &[&str]) -> serde_json::Value {
        json!({
            "status": "OK",
            "results": ids.iter().map(|id| result_json(id)).collect::<Vec<_>>()
        })
    }

    fn test_client(server: &MockServer) -> GooglePlacesClient {
        GooglePlacesClient::with_base_url("test_key".to_string(), server.uri())
    }

    #[tokio::test]
    async fn test_multi_type_search_queries_each_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "bakery"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["horno", "shared"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "cafe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["shared", "tostadero"])))
            .expect(1)
            .mount(&server)
            .await;

        let types: BTreeSet<String> = ["cafe".to_string(), "bakery".to_string()]
            .into_iter()
            .collect();
        let places = test_client(&server)
            .search(Coordinate::new(41.65, -0.88), 1000.0, Some(&types))
            .await
            .unwrap();

        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["horno", "shared", "tostadero"]);
    }

    #[tokio::test]
    async fn test_unfiltered_search_sends_no_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("radius", "1000"))
            .and(query_param_is_missing("type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["plaza"])))
            .expect(1)
            .mount(&server)
            .await;

        let places = test_client(&server)
            .search(Coordinate::new(41.65, -0.88), 1000.0, None)
            .await
            .unwrap();
        assert_eq!(places.len(), 1);
    }

    #[tokio::test]
    async fn test_multi_type_search_keeps_partial_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "bakery"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "INVALID_REQUEST"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "cafe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["tostadero"])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let both: BTreeSet<String> = ["cafe".to_string(), "bakery".to_string()]
            .into_iter()
            .collect();
        let places = client
            .search(Coordinate::new(41.65, -0.88), 1000.0, Some(&both))
            .await
            .unwrap();
        assert_eq!(places.len(), 1);

        let bakery_only: BTreeSet<String> = ["bakery".to_string()].into_iter().collect();
        let failed = client
            .search(Coordinate::new(41.65, -0.88), 1000.0, Some(&bakery_only))
            .await;
        assert!(matches!(failed, Err(PlacesError::ProviderQueryFailed(_))));
    }

    #[tokio::test]
    async fn test_place_details() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/details/json"))
            .and(query_param("place_id", "ChIJmuseo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "result": {
                    "place_id": "ChIJmuseo",
                    "name": "Museo Goya",
                    "formatted_address": "Calle Espoz y Mina 23, 50003 Zaragoza",
                    "geometry": {"location": {"lat": 41.6540, "lng": -0.8760}},
                    "rating": 4.6,
                    "types": ["museum", "point_of_interest"],
                    "opening_hours": {
                        "open_now": false,
                        "weekday_text": ["Monday: Closed"]
                    }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .and(query_param("place_id", "missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "NOT_FOUND"})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let details = client.details("ChIJmuseo").await.unwrap();

        assert_eq!(details.name, "Museo Goya");
        assert_eq!(details.location, Some(Coordinate::new(41.6540, -0.8760)));
        assert_eq!(details.open_now, Some(false));
        assert_eq!(details.opening_hours, vec!["Monday: Closed"]);
        assert_eq!(details.price_level, None);

        assert_eq!(
            client.details("missing").await,
            Err(PlacesError::PlaceNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_interpret_details_quota() {
        let quota = GooglePlaceDetailsResponse {
            result: None,
            status: "OVER_QUERY_LIMIT".to_string(),
            error_message: None,
        };
        assert_eq!(
            GooglePlacesClient::interpret_details("x", quota),
            Err(PlacesError::RateLimitExceeded)
        );
    }
}
