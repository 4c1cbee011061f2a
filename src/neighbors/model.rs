//! Upload/download speed prediction over server locations

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::models::Location;
use crate::neighbors::evaluation::{
    DEFAULT_FOLDS, EvaluationReport, cross_val_rmse, mean_and_stddev, rmse,
};
use crate::neighbors::metric::{DistanceMetric, Point};
use crate::neighbors::regressor::KnnRegressor;
use crate::neighbors::split::TrainTestSplit;
use crate::{Result, SpeedMapError};

/// Hyperparameters of a [`NeighborModel`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Neighbours averaged per prediction
    pub n_neighbors: usize,
    pub distance_mode: DistanceMetric,
    /// Whether location and query coordinates are already radians
    pub coordinates_are_radians: bool,
    /// Share of rows held out from training, in (0, 1)
    pub test_fraction: f64,
    pub random_seed: u64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            distance_mode: DistanceMetric::GreatCircle,
            coordinates_are_radians: false,
            test_fraction: 0.2,
            random_seed: 42,
        }
    }
}

impl ModelOptions {
    #[must_use]
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    #[must_use]
    pub fn with_distance_mode(mut self, distance_mode: DistanceMetric) -> Self {
        self.distance_mode = distance_mode;
        self
    }

    #[must_use]
    pub fn with_coordinates_are_radians(mut self, coordinates_are_radians: bool) -> Self {
        self.coordinates_are_radians = coordinates_are_radians;
        self
    }

    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    #[must_use]
    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_neighbors == 0 {
            return Err(SpeedMapError::invalid_parameter(
                "n_neighbors must be at least 1",
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SpeedMapError::invalid_parameter(format!(
                "test_fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// A training location matched by [`NeighborModel::find_nearest`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub location: &'a Location,
    /// Kilometers for great-circle models, coordinate units for Euclidean ones
    pub distance: f64,
}

/// Predicted speeds in Mbps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub upload: f64,
    pub download: f64,
}

/// Two KNN regressors, one per speed, fit on the same training rows.
///
/// Training happens inside [`NeighborModel::new`]; the model is read-only
/// afterwards and can be queried from several threads at once.
#[derive(Debug, Clone)]
pub struct NeighborModel {
    locations: Vec<Location>,
    options: ModelOptions,
    features: Vec<Point>,
    uploads: Vec<f64>,
    downloads: Vec<f64>,
    split: TrainTestSplit,
    upload_model: KnnRegressor,
    download_model: KnnRegressor,
}

impl NeighborModel {
    /// Build and train a model over `locations`.
    ///
    /// # Errors
    ///
    /// * `EmptyDataset` if `locations` is empty
    /// * `InvalidParameter` if `n_neighbors` is zero or not below the
    ///   training size, or `test_fraction` is outside (0, 1)
    /// * `TrainingFailed` if the regressors cannot be fit
    #[instrument(name = "train_neighbor_model", level = "debug", skip(locations), fields(samples = locations.len()))]
    pub fn new(locations: Vec<Location>, options: ModelOptions) -> Result<Self> {
        if locations.is_empty() {
            return Err(SpeedMapError::empty_dataset(
                "a neighbour model needs at least one location",
            ));
        }
        options.validate()?;

        let features: Vec<Point> = locations
            .iter()
            .map(|loc| {
                options
                    .distance_mode
                    .normalize([loc.latitude(), loc.longitude()], options.coordinates_are_radians)
            })
            .collect();
        let uploads: Vec<f64> = locations.iter().map(Location::upload).collect();
        let downloads: Vec<f64> = locations.iter().map(Location::download).collect();

        let split =
            TrainTestSplit::new(locations.len(), options.test_fraction, options.random_seed)?;
        debug!(
            "Partitioned {} rows into {} training and {} test rows",
            locations.len(),
            split.train().len(),
            split.test().len()
        );

        if options.n_neighbors >= split.train().len() {
            return Err(SpeedMapError::invalid_parameter(format!(
                "n_neighbors ({}) must be smaller than the training set ({} rows)",
                options.n_neighbors,
                split.train().len()
            )));
        }

        let train_points: Vec<Point> = split.train().iter().map(|&row| features[row]).collect();
        let pick = |targets: &[f64]| -> Vec<f64> {
            split.train().iter().map(|&row| targets[row]).collect()
        };

        let upload_model = KnnRegressor::fit(
            train_points.clone(),
            pick(uploads.as_slice()),
            options.n_neighbors,
            options.distance_mode,
        )?;
        let download_model = KnnRegressor::fit(
            train_points,
            pick(downloads.as_slice()),
            options.n_neighbors,
            options.distance_mode,
        )?;

        info!(
            "Trained {} neighbour model (k = {}) on {} of {} locations",
            options.distance_mode,
            options.n_neighbors,
            split.train().len(),
            locations.len()
        );

        Ok(Self {
            locations,
            options,
            features,
            uploads,
            downloads,
            split,
            upload_model,
            download_model,
        })
    }

    fn normalize_query(&self, lat: f64, lon: f64) -> Result<Point> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(SpeedMapError::invalid_coordinate(format!(
                "query ({lat}, {lon}) is not finite"
            )));
        }
        Ok(self
            .options
            .distance_mode
            .normalize([lat, lon], self.options.coordinates_are_radians))
    }

    /// Training locations closest to the query, nearest first.
    ///
    /// Searches the upload regressor's index; both regressors share the
    /// same training rows so the download index would answer the same.
    pub fn find_nearest(&self, lat: f64, lon: f64) -> Result<Vec<Neighbor<'_>>> {
        let query = self.normalize_query(lat, lon)?;

        let neighbors: Vec<Neighbor<'_>> = self
            .upload_model
            .kneighbors(query)
            .into_iter()
            .map(|(row, distance)| Neighbor {
                location: &self.locations[self.split.train()[row]],
                distance,
            })
            .collect();

        if let Some(closest) = neighbors.first() {
            debug!("Closest location to ({lat}, {lon}) is {} at {:.3}", closest.location, closest.distance);
        }

        Ok(neighbors)
    }

    /// Inverse-distance-weighted upload and download speeds at the query point
    pub fn predict(&self, lat: f64, lon: f64) -> Result<Prediction> {
        let query = self.normalize_query(lat, lon)?;

        Ok(Prediction {
            upload: self.upload_model.predict(query),
            download: self.download_model.predict(query),
        })
    }

    /// 5-fold cross-validated RMSE over the full dataset
    #[instrument(level = "debug", skip(self))]
    pub fn evaluate(&self) -> Result<EvaluationReport> {
        let k = self.options.n_neighbors;
        let metric = self.options.distance_mode;

        let upload_scores = cross_val_rmse(&self.features, &self.uploads, k, metric, DEFAULT_FOLDS)?;
        let download_scores =
            cross_val_rmse(&self.features, &self.downloads, k, metric, DEFAULT_FOLDS)?;

        let (upload_rmse_mean, upload_rmse_stddev) = mean_and_stddev(&upload_scores);
        let (download_rmse_mean, download_rmse_stddev) = mean_and_stddev(&download_scores);

        let report = EvaluationReport {
            sample_count: self.locations.len(),
            upload_rmse_mean,
            download_rmse_mean,
            upload_rmse_stddev,
            download_rmse_stddev,
        };
        info!("Cross-validation finished: {}", report);
        Ok(report)
    }

    /// RMSE of `(upload, download)` on the held-out rows, `None` if none were held out
    #[must_use]
    pub fn holdout_rmse(&self) -> Option<(f64, f64)> {
        let test = self.split.test();
        if test.is_empty() {
            return None;
        }

        let queries: Vec<Point> = test.iter().map(|&row| self.features[row]).collect();
        let actual = |targets: &[f64]| -> Vec<f64> { test.iter().map(|&row| targets[row]).collect() };

        Some((
            rmse(&actual(self.uploads.as_slice()), &self.upload_model.predict_many(&queries)),
            rmse(&actual(self.downloads.as_slice()), &self.download_model.predict_many(&queries)),
        ))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    #[must_use]
    pub fn n_neighbors(&self) -> usize {
        self.options.n_neighbors
    }

    #[must_use]
    pub fn distance_mode(&self) -> DistanceMetric {
        self.options.distance_mode
    }

    #[must_use]
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    #[must_use]
    pub fn training_size(&self) -> usize {
        self.split.train().len()
    }

    #[must_use]
    pub fn test_size(&self) -> usize {
        self.split.test().len()
    }
}
