//! Raw speed-test records and their join with server coordinates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::Result;
use crate::models::Location;

/// One speed-test run as recorded by the measuring device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeedTestResult {
    /// Server the test ran against
    pub server: String,
    /// Ping in milliseconds
    pub ping: f64,
    /// Download speed in Mbps
    pub download: f64,
    /// Upload speed in Mbps
    pub upload: f64,
    /// Device the test ran on
    #[serde(default)]
    pub device: Option<String>,
}

/// Geographic position of a speed-test server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerCoordinate {
    pub server: String,
    /// Latitude in radians
    pub latitude: f64,
    /// Longitude in radians
    pub longitude: f64,
}

/// Inner-join speed-test results with server coordinates by server name.
///
/// Output follows the order of `results`. Results whose server has no
/// coordinates are skipped; for duplicated servers the first coordinate wins.
pub fn join_locations(
    results: &[SpeedTestResult],
    coordinates: &[ServerCoordinate],
) -> Result<Vec<Location>> {
    let mut by_server: HashMap<&str, &ServerCoordinate> = HashMap::new();
    for coordinate in coordinates {
        by_server.entry(coordinate.server.as_str()).or_insert(coordinate);
    }

    let mut locations = Vec::with_capacity(results.len());
    let mut skipped = 0usize;

    for result in results {
        let Some(coordinate) = by_server.get(result.server.as_str()) else {
            debug!("No coordinates for server {}, skipping result", result.server);
            skipped += 1;
            continue;
        };

        locations.push(Location::new(
            coordinate.latitude,
            coordinate.longitude,
            result.server.clone(),
            result.upload,
            result.download,
            Some(result.ping),
        )?);
    }

    info!(
        "Joined {} locations from {} results ({} without coordinates)",
        locations.len(),
        results.len(),
        skipped
    );

    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpeedMapError;

    fn result(server: &str, upload: f64, download: f64) -> SpeedTestResult {
        SpeedTestResult {
            server: server.to_string(),
            ping: 12.0,
            download,
            upload,
            device: Some("laptop".to_string()),
        }
    }

    fn coordinate(server: &str, latitude: f64, longitude: f64) -> ServerCoordinate {
        ServerCoordinate {
            server: server.to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_join_keeps_result_order_and_skips_unmatched() {
        let results = vec![
            result("Berlin", 40.0, 200.0),
            result("Atlantis", 1.0, 1.0),
            result("Madrid", 20.0, 90.0),
            result("Berlin", 42.0, 210.0),
        ];
        let coordinates = vec![coordinate("Madrid", 0.70, -0.06), coordinate("Berlin", 0.91, 0.23)];

        let locations = join_locations(&results, &coordinates).unwrap();

        let names: Vec<&str> = locations.iter().map(Location::name).collect();
        assert_eq!(names, vec!["Berlin", "Madrid", "Berlin"]);
        assert_eq!(locations[2].upload(), 42.0);
        assert_eq!(locations[0].ping(), Some(12.0));
        assert_eq!(locations[1].latitude(), 0.70);
    }

    #[test]
    fn test_join_first_duplicate_coordinate_wins() {
        let results = vec![result("Paris", 10.0, 50.0)];
        let coordinates = vec![coordinate("Paris", 0.85, 0.04), coordinate("Paris", 0.10, 0.10)];

        let locations = join_locations(&results, &coordinates).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].latitude(), 0.85);
    }

    #[test]
    fn test_join_propagates_validation_errors() {
        let results = vec![result("Pole", 10.0, 50.0)];
        let coordinates = vec![coordinate("Pole", 3.0, 0.0)];

        let err = join_locations(&results, &coordinates).unwrap_err();
        assert!(matches!(err, SpeedMapError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_result_deserializes_without_device() {
        let parsed: SpeedTestResult = serde_json::from_str(
            r#"{"server": "Vienna", "ping": 9.5, "download": 310.2, "upload": 55.1}"#,
        )
        .unwrap();
        assert_eq!(parsed.device, None);
        assert_eq!(parsed.download, 310.2);
    }
}
