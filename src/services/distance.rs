// src/services/distance.rs
// DOCUMENTATION: Great-circle distance and display formatting
// PURPOSE: Pure geometry shared by the geo-query cache and the presentation layer

use crate::models::Coordinate;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates in meters
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for near-antipodal pairs
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Total length of a polyline in meters
/// DOCUMENTATION: Sum of consecutive pairwise distances, 0 for fewer than 2 points
pub fn route_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance(pair[0], pair[1]))
        .sum()
}

/// Format a distance for display: "999m" below a kilometer, "1.5km" above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// Format a duration for display
/// DOCUMENTATION: Shows one unit pair, coarser unit first:
/// "1h 1m" from one hour, "1m 1s" from one minute, otherwise "5s"
pub fn format_duration(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn test_distance_zero_and_symmetric() {
        let a = Coordinate::new(41.6488, -0.8891);
        let b = Coordinate::new(40.4168, -3.7038);

        assert_eq!(distance(a, a), 0.0);
        assert!((distance(a, b) - distance(b, a)).abs() < TOLERANCE);
    }

    #[test]
    fn test_distance_known_value() {
        // Zaragoza to Madrid, roughly 274 km
        let zaragoza = Coordinate::new(41.6488, -0.8891);
        let madrid = Coordinate::new(40.4168, -3.7038);
        let meters = distance(zaragoza, madrid);

        assert!(meters > 270_000.0 && meters < 280_000.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let meters = distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((meters - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn test_colinear_points_on_meridian() {
        let a = Coordinate::new(10.0, 5.0);
        let b = Coordinate::new(10.01, 5.0);
        let c = Coordinate::new(10.02, 5.0);

        let direct = distance(a, c);
        let via_b = distance(a, b) + distance(b, c);
        assert!((direct - via_b).abs() < 1e-3);
    }

    #[test]
    fn test_triangle_inequality() {
        let a = Coordinate::new(41.65, -0.88);
        let b = Coordinate::new(41.66, -0.87);
        let c = Coordinate::new(41.64, -0.86);

        assert!(distance(a, c) <= distance(a, b) + distance(b, c) + TOLERANCE);
    }

    #[test]
    fn test_near_antipodal_pairs_are_finite() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;

        for step in 0..2000 {
            let lat = -89.0 + step as f64 * 0.089;
            let a = Coordinate::new(lat, 10.0);
            let b = Coordinate::new(-lat + 1e-12, -170.0);
            let meters = distance(a, b);

            assert!(meters.is_finite(), "NaN distance for latitude {}", lat);
            assert!(meters <= half_circumference + TOLERANCE);
            assert!(meters > half_circumference - 1.0);
        }
    }

    #[test]
    fn test_route_length() {
        let p = Coordinate::new(41.65, -0.88);
        let q = Coordinate::new(41.66, -0.88);
        let r = Coordinate::new(41.66, -0.87);

        assert_eq!(route_length(&[]), 0.0);
        assert_eq!(route_length(&[p]), 0.0);
        assert_eq!(route_length(&[p, q]), distance(p, q));
        assert!((route_length(&[p, q, r]) - (distance(p, q) + distance(q, r))).abs() < TOLERANCE);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(42.4), "42m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(1500.0), "1.5km");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3_661_000), "1h 1m");
        assert_eq!(format_duration(61_000), "1m 1s");
        assert_eq!(format_duration(5_000), "5s");
        assert_eq!(format_duration(999), "0s");
        assert_eq!(format_duration(7_200_000), "2h 0m");
    }
}
