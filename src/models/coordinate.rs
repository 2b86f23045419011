// src/models/coordinate.rs
// DOCUMENTATION: Geographic coordinate value type
// PURPOSE: Shared position type for engine, providers and walk tracking

use serde::{Deserialize, Serialize};

/// WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside WGS84 bounds
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// geo-types uses x = longitude, y = latitude
impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo_types::Coord {
            x: coordinate.longitude,
            y: coordinate.latitude,
        }
    }
}
