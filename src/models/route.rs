// src/models/route.rs
// DOCUMENTATION: Walk route DTOs
// PURPOSE: Request and response shapes for POST /routes/summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Coordinate;

/// One recorded fix of a walk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl RoutePoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Request DTO for POST /routes/summary
#[derive(Debug, Deserialize, Validate)]
pub struct RouteSummaryRequest {
    #[validate(length(max = 10000))]
    pub points: Vec<RoutePoint>,
}

/// Summary of a walk for display
#[derive(Debug, Serialize, Deserialize)]
pub struct RouteSummaryResponse {
    pub point_count: usize,
    /// Route length in meters
    pub distance: f64,
    pub distance_text: String,
    /// Elapsed milliseconds between the first and last point
    pub duration_ms: u64,
    pub duration_text: String,
    /// GeoJSON LineString geometry (absent for fewer than 2 points)
    pub geometry: Option<geojson::Geometry>,
}
