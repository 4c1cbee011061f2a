//! `SpeedMap` - location-aware prediction of internet speed-test results
//!
//! This library validates geo-tagged speed measurements, computes great-circle
//! distances, and fits nearest-neighbour regressors that predict upload and
//! download speeds at arbitrary coordinates.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod neighbors;

// Re-export core types for public API
pub use crate::config::SpeedMapConfig;
pub use error::SpeedMapError;
pub use models::{Location, ServerCoordinate, SpeedTestResult, join_locations};
pub use neighbors::{
    DistanceMetric, EvaluationReport, ModelOptions, Neighbor, NeighborModel, Prediction,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SpeedMapError>;
