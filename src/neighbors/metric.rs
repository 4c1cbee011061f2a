//! Point distance under the supported metrics

use serde::{Deserialize, Serialize};

use crate::models::haversine_km;

/// A `[latitude, longitude]` feature row
pub type Point = [f64; 2];

/// Distance metric used for neighbour search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Haversine distance on the Earth sphere, in kilometers
    #[default]
    GreatCircle,
    /// Plain distance in coordinate units
    Euclidean,
}

impl DistanceMetric {
    #[must_use]
    pub fn distance(self, a: Point, b: Point) -> f64 {
        match self {
            DistanceMetric::GreatCircle => haversine_km(a[0], a[1], b[0], b[1]),
            DistanceMetric::Euclidean => (a[0] - b[0]).hypot(a[1] - b[1]),
        }
    }

    /// Bring caller coordinates into the space the metric works in.
    ///
    /// Great-circle distance needs radians, so degree input is converted;
    /// Euclidean distance uses the coordinates unchanged.
    #[must_use]
    pub fn normalize(self, point: Point, coordinates_are_radians: bool) -> Point {
        match self {
            DistanceMetric::GreatCircle if !coordinates_are_radians => {
                [point[0].to_radians(), point[1].to_radians()]
            }
            _ => point,
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::GreatCircle => write!(f, "great_circle"),
            DistanceMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EARTH_RADIUS_KM;
    use std::f64::consts::PI;

    #[test]
    fn test_euclidean_distance() {
        let d = DistanceMetric::Euclidean.distance([0.0, 0.0], [3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_great_circle_distance_in_km() {
        let d = DistanceMetric::GreatCircle.distance([0.0, 0.0], [0.0, PI]);
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let p = DistanceMetric::GreatCircle.normalize([180.0, -90.0], false);
        assert!((p[0] - PI).abs() < 1e-12);
        assert!((p[1] + PI / 2.0).abs() < 1e-12);

        assert_eq!(DistanceMetric::GreatCircle.normalize([0.3, 0.4], true), [0.3, 0.4]);
        assert_eq!(DistanceMetric::Euclidean.normalize([30.0, 40.0], false), [30.0, 40.0]);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DistanceMetric::GreatCircle).unwrap();
        assert_eq!(json, "\"great_circle\"");
        let metric: DistanceMetric = serde_json::from_str("\"euclidean\"").unwrap();
        assert_eq!(metric, DistanceMetric::Euclidean);
    }
}
