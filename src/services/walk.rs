// src/services/walk.rs
// DOCUMENTATION: Walk route recording
// PURPOSE: Collect timestamped fixes of a walk and summarize them for display

use crate::models::{Coordinate, RoutePoint, RouteSummaryResponse};
use crate::services::{format_distance, format_duration, route_length, PositionSubscription};
use chrono::Utc;

/// Ordered route of one walk
#[derive(Debug, Default, Clone)]
pub struct WalkSession {
    points: Vec<RoutePoint>,
}

impl From<Vec<RoutePoint>> for WalkSession {
    fn from(mut points: Vec<RoutePoint>) -> Self {
        points.retain(|p| p.coordinate().is_valid());
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }
}

impl WalkSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fix stamped with the current time
    /// Invalid coordinates are dropped
    pub fn record(&mut self, coordinate: Coordinate) -> bool {
        if !coordinate.is_valid() {
            log::warn!("Ignoring invalid route point: {:?}", coordinate);
            return false;
        }

        self.points.push(RoutePoint {
            lat: coordinate.latitude,
            lng: coordinate.longitude,
            timestamp: Utc::now(),
        });
        true
    }

    /// Record fixes from a subscription until it ends, errors, or `max_points` are stored
    pub async fn follow(&mut self, subscription: &mut PositionSubscription, max_points: usize) -> usize {
        let mut recorded = 0;

        while recorded < max_points {
            match subscription.next().await {
                Some(Ok(coordinate)) => {
                    if self.record(coordinate) {
                        recorded += 1;
                    }
                }
                Some(Err(e)) => {
                    log::warn!("Stopped following position updates: {}", e);
                    break;
                }
                None => break,
            }
        }

        recorded
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.points.iter().map(RoutePoint::coordinate).collect()
    }

    /// Walked distance in meters
    pub fn distance(&self) -> f64 {
        route_length(&self.coordinates())
    }

    /// Milliseconds between the first and last fix
    pub fn duration_ms(&self) -> u64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp)
                .num_milliseconds()
                .max(0) as u64,
            _ => 0,
        }
    }

    pub fn line_string(&self) -> geo_types::LineString<f64> {
        self.coordinates()
            .into_iter()
            .map(geo_types::Coord::from)
            .collect()
    }

    /// GeoJSON polyline, None for fewer than 2 points
    pub fn geometry(&self) -> Option<geojson::Geometry> {
        if self.points.len() < 2 {
            return None;
        }

        let positions = self
            .line_string()
            .coords()
            .map(|c| vec![c.x, c.y])
            .collect();

        Some(geojson::Geometry::new(geojson::Value::LineString(positions)))
    }

    pub fn summary(&self) -> RouteSummaryResponse {
        let distance = self.distance();
        let duration_ms = self.duration_ms();

        RouteSummaryResponse {
            point_count: self.points.len(),
            distance,
            distance_text: format_distance(distance),
            duration_ms,
            duration_text: format_duration(duration_ms),
            geometry: self.geometry(),
        }
    }
}
