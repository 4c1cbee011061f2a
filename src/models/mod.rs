//! Data models for `SpeedMap`
//!
//! - Location: validated geo-tagged speed measurement
//! - Speedtest: raw speed-test rows and server coordinates

pub mod location;
pub mod speedtest;

pub use location::{EARTH_RADIUS_KM, Location, haversine_km};
pub use speedtest::{ServerCoordinate, SpeedTestResult, join_locations};
