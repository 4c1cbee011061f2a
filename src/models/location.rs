//! Location model for geo-tagged speed measurements

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use crate::{Result, SpeedMapError};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in radians
#[must_use]
pub fn haversine_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let dlat = lat_b - lat_a;
    let dlon = lon_b - lon_a;

    let a = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.clamp(0.0, 1.0).sqrt().asin()
}

/// A speed-test measurement tagged with the coordinates of its server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    /// Latitude in radians
    latitude: f64,
    /// Longitude in radians
    longitude: f64,
    /// Server name
    name: String,
    /// Upload speed in Mbps
    upload: f64,
    /// Download speed in Mbps
    download: f64,
    /// Ping in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    ping: Option<f64>,
}

#[derive(Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
    name: String,
    upload: f64,
    download: f64,
    #[serde(default)]
    ping: Option<f64>,
}

impl TryFrom<RawLocation> for Location {
    type Error = SpeedMapError;

    fn try_from(raw: RawLocation) -> Result<Self> {
        Location::new(
            raw.latitude,
            raw.longitude,
            raw.name,
            raw.upload,
            raw.download,
            raw.ping,
        )
    }
}

fn ensure_number(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SpeedMapError::invalid_type(format!(
            "{field} must be a finite number, got {value}"
        )))
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<f64> {
    if value < 0.0 {
        return Err(SpeedMapError::invalid_parameter(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(value)
}

fn json_number(record: &Value, field: &str) -> Result<f64> {
    match record.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| SpeedMapError::invalid_type(format!("{field} is not representable as f64"))),
        Some(other) => Err(SpeedMapError::invalid_type(format!(
            "{field} must be numeric, got {other}"
        ))),
        None => Err(SpeedMapError::invalid_type(format!("{field} is missing"))),
    }
}

impl Location {
    /// Create a new location, validating every field.
    ///
    /// # Errors
    ///
    /// * `InvalidType` if a numeric field is NaN or infinite
    /// * `InvalidCoordinate` if latitude is outside [-π/2, π/2] or longitude outside [-π, π]
    /// * `InvalidParameter` if a speed or the ping is negative
    pub fn new(
        latitude: f64,
        longitude: f64,
        name: impl Into<String>,
        upload: f64,
        download: f64,
        ping: Option<f64>,
    ) -> Result<Self> {
        let ping = ping.map(|p| ensure_number("ping", p)).transpose()?;
        let download = ensure_number("download", download)?;
        let upload = ensure_number("upload", upload)?;
        let latitude = ensure_number("latitude", latitude)?;
        let longitude = ensure_number("longitude", longitude)?;

        if !Self::is_valid_coordinate(latitude, longitude) {
            return Err(SpeedMapError::invalid_coordinate(format!(
                "({latitude}, {longitude}) is outside the valid radian range"
            )));
        }

        ensure_non_negative("upload", upload)?;
        ensure_non_negative("download", download)?;
        if let Some(p) = ping {
            ensure_non_negative("ping", p)?;
        }

        Ok(Self {
            latitude,
            longitude,
            name: name.into(),
            upload,
            download,
            ping,
        })
    }

    /// Build a location from a loosely typed record such as a parsed sheet row.
    ///
    /// Expects the keys `latitude`, `longitude`, `name`, `upload`, `download`
    /// and optionally `ping`.
    pub fn from_json(record: &Value) -> Result<Self> {
        let name = match record.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(SpeedMapError::invalid_type(format!(
                    "name must be a string, got {other}"
                )));
            }
            None => return Err(SpeedMapError::invalid_type("name is missing")),
        };

        let ping = match record.get("ping") {
            None | Some(Value::Null) => None,
            Some(_) => Some(json_number(record, "ping")?),
        };

        Self::new(
            json_number(record, "latitude")?,
            json_number(record, "longitude")?,
            name,
            json_number(record, "upload")?,
            json_number(record, "download")?,
            ping,
        )
    }

    /// Whether the pair lies within [-π/2, π/2] x [-π, π]
    #[must_use]
    pub fn is_valid_coordinate(lat_rad: f64, lon_rad: f64) -> bool {
        (-FRAC_PI_2..=FRAC_PI_2).contains(&lat_rad) && (-PI..=PI).contains(&lon_rad)
    }

    /// Great-circle distance in kilometers from this location to the given point (radians)
    #[must_use]
    pub fn haversine_distance(&self, lat_rad: f64, lon_rad: f64) -> f64 {
        haversine_km(self.latitude, self.longitude, lat_rad, lon_rad)
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn upload(&self) -> f64 {
        self.upload
    }

    #[must_use]
    pub fn download(&self) -> f64 {
        self.download
    }

    #[must_use]
    pub fn ping(&self) -> Option<f64> {
        self.ping
    }

    /// Format location as degree coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!(
            "{:.4}, {:.4}",
            self.latitude.to_degrees(),
            self.longitude.to_degrees()
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.format_coordinates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_haversine_distance_zero() {
        let loc = Location::new(0.0, 0.0, "Origin", 0.0, 0.0, Some(0.0)).unwrap();
        let distance = loc.haversine_distance(0.0, 0.0);
        assert!(distance.abs() < 1e-9);
    }

    #[test]
    fn test_haversine_distance_london_paris() {
        let loc = Location::new(
            51.5074_f64.to_radians(),
            (-0.1278_f64).to_radians(),
            "London",
            0.0,
            0.0,
            Some(0.0),
        )
        .unwrap();
        let distance = loc.haversine_distance(48.8566_f64.to_radians(), 2.3522_f64.to_radians());
        assert!((distance - 343.0).abs() < 343.0 * 0.01);
    }

    #[test]
    fn test_haversine_distance_antipodal() {
        let loc = Location::new(0.0, 0.0, "Origin", 0.0, 0.0, None).unwrap();
        let expected = PI * EARTH_RADIUS_KM;
        assert!((loc.haversine_distance(0.0, PI) - expected).abs() < expected * 1e-6);
    }

    #[test]
    fn test_haversine_distance_quarter_equator() {
        let loc = Location::new(0.0, 0.0, "Equator", 0.0, 0.0, None).unwrap();
        let expected = FRAC_PI_2 * EARTH_RADIUS_KM;
        assert!((loc.haversine_distance(0.0, FRAC_PI_2) - expected).abs() < expected * 1e-6);
    }

    #[test]
    fn test_latitude_out_of_range() {
        let err = Location::new(PI, 0.0, "Nowhere", 1.0, 1.0, None).unwrap_err();
        assert!(matches!(err, SpeedMapError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_longitude_out_of_range() {
        let err = Location::new(0.0, -3.5, "Nowhere", 1.0, 1.0, None).unwrap_err();
        assert!(matches!(err, SpeedMapError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(Location::is_valid_coordinate(FRAC_PI_2, PI));
        assert!(Location::is_valid_coordinate(-FRAC_PI_2, -PI));
        assert!(!Location::is_valid_coordinate(FRAC_PI_2 + 1e-9, 0.0));
    }

    #[test]
    fn test_nan_upload_is_invalid_type() {
        let err = Location::new(0.0, 0.0, "Server", f64::NAN, 1.0, None).unwrap_err();
        assert!(matches!(err, SpeedMapError::InvalidType { .. }));
    }

    #[test]
    fn test_negative_download_rejected() {
        let err = Location::new(0.0, 0.0, "Server", 1.0, -2.0, None).unwrap_err();
        assert!(matches!(err, SpeedMapError::InvalidParameter { .. }));
    }

    #[test]
    fn test_from_json_non_numeric_upload() {
        let record = json!({
            "latitude": 0.5,
            "longitude": 0.1,
            "name": "Oslo",
            "upload": "fast",
            "download": 120.0,
        });
        let err = Location::from_json(&record).unwrap_err();
        assert!(matches!(err, SpeedMapError::InvalidType { .. }));
    }

    #[test]
    fn test_from_json_optional_ping() {
        let record = json!({
            "latitude": 0.5,
            "longitude": 0.1,
            "name": "Oslo",
            "upload": 40,
            "download": 120.5,
        });
        let loc = Location::from_json(&record).unwrap();
        assert_eq!(loc.name(), "Oslo");
        assert_eq!(loc.upload(), 40.0);
        assert_eq!(loc.ping(), None);
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<Location>(
            r#"{"latitude": 2.0, "longitude": 0.0, "name": "x", "upload": 1.0, "download": 1.0}"#,
        );
        assert!(err.is_err());

        let loc: Location = serde_json::from_str(
            r#"{"latitude": 0.2, "longitude": 0.3, "name": "x", "upload": 1.0, "download": 2.0, "ping": 12.0}"#,
        )
        .unwrap();
        assert_eq!(loc.ping(), Some(12.0));
    }

    #[test]
    fn test_format_coordinates() {
        let loc = Location::new(FRAC_PI_2 / 2.0, 0.0, "x", 0.0, 0.0, None).unwrap();
        assert_eq!(loc.format_coordinates(), "45.0000, 0.0000");
    }

    #[test]
    fn test_display_shows_name_and_degrees() {
        let loc = Location::new(0.0, -FRAC_PI_2, "Quito", 5.0, 50.0, None).unwrap();
        assert_eq!(loc.to_string(), "Quito (0.0000, -90.0000)");
    }
}
