// src/services/provider.rs
// DOCUMENTATION: Places-search provider seam
// PURPOSE: Abstract the third-party nearby search so the engine can be tested and swapped

use crate::errors::PlacesError;
use crate::models::{Coordinate, PlaceDetails, RawPlace};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Places-search provider consumed by GeoQueryCache
/// DOCUMENTATION: One awaitable call per search, no internal parallelism
///
/// Implementations report a non-success provider status as
/// `PlacesError::ProviderQueryFailed`; the engine turns that into an empty result.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Prepare the provider for searches
    /// Fails with `PlacesError::ProviderUnavailable` when the service cannot be used
    async fn initialize(&self) -> Result<(), PlacesError>;

    /// Nearby search around `center`
    ///
    /// # Arguments
    /// * `center` - Search center
    /// * `radius_meters` - Search radius
    /// * `type_filter` - Provider types to restrict to, None for general results
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: f64,
        type_filter: Option<&BTreeSet<String>>,
    ) -> Result<Vec<RawPlace>, PlacesError>;

    /// Details for one place by provider id
    /// Fails with `PlacesError::PlaceNotFound` when the id is unknown
    async fn details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;
}
