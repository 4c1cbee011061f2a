//! Nearest-neighbour prediction module
//!
//! This module provides:
//! - Great-circle and Euclidean distance metrics
//! - A brute-force KNN regressor with inverse-distance weighting
//! - Seeded train/test partitioning
//! - K-fold cross-validated evaluation
//! - `NeighborModel`, pairing an upload and a download regressor

pub mod evaluation;
pub mod metric;
pub mod model;
pub mod regressor;
pub mod split;

pub use evaluation::{DEFAULT_FOLDS, EvaluationReport, cross_val_rmse};
pub use metric::{DistanceMetric, Point};
pub use model::{ModelOptions, Neighbor, NeighborModel, Prediction};
pub use regressor::{KnnRegressor, NeighborIndex};
pub use split::TrainTestSplit;
