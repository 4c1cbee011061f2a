//! K-fold cross-validation for the neighbour regressors
//!
//! Folds are contiguous and unshuffled; when the row count does not divide
//! evenly the first `n % folds` folds take one extra row. Each fold refits a
//! fresh regressor on the remaining rows and is scored by RMSE.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::neighbors::metric::{DistanceMetric, Point};
use crate::neighbors::regressor::KnnRegressor;
use crate::{Result, SpeedMapError};

/// Number of folds used by `NeighborModel::evaluate`
pub const DEFAULT_FOLDS: usize = 5;

/// Cross-validated error of the upload and download models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub sample_count: usize,
    pub upload_rmse_mean: f64,
    pub download_rmse_mean: f64,
    pub upload_rmse_stddev: f64,
    pub download_rmse_stddev: f64,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples, upload RMSE {:.2} ± {:.2} Mbps, download RMSE {:.2} ± {:.2} Mbps",
            self.sample_count,
            self.upload_rmse_mean,
            self.upload_rmse_stddev,
            self.download_rmse_mean,
            self.download_rmse_stddev
        )
    }
}

/// Contiguous row ranges of each fold
#[must_use]
pub fn kfold_bounds(n: usize, folds: usize) -> Vec<Range<usize>> {
    let base = n / folds;
    let extra = n % folds;
    let mut start = 0;
    (0..folds)
        .map(|fold| {
            let len = base + usize::from(fold < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

#[must_use]
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

/// Mean and sample (n - 1) standard deviation
#[must_use]
pub fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Per-fold RMSE of a KNN regressor over `points` and `targets`.
///
/// # Errors
///
/// `InvalidParameter` when there are fewer rows than folds or a fold leaves
/// fewer training rows than `n_neighbors`.
pub fn cross_val_rmse(
    points: &[Point],
    targets: &[f64],
    n_neighbors: usize,
    metric: DistanceMetric,
    folds: usize,
) -> Result<Vec<f64>> {
    let n = points.len();
    if folds < 2 {
        return Err(SpeedMapError::invalid_parameter(format!(
            "cross-validation needs at least 2 folds, got {folds}"
        )));
    }
    if n < folds {
        return Err(SpeedMapError::invalid_parameter(format!(
            "cannot split {n} samples into {folds} folds"
        )));
    }

    let mut scores = Vec::with_capacity(folds);
    for held_out in kfold_bounds(n, folds) {
        let train_rows = n - held_out.len();
        if n_neighbors > train_rows {
            return Err(SpeedMapError::invalid_parameter(format!(
                "n_neighbors ({n_neighbors}) exceeds the {train_rows} training rows of a fold"
            )));
        }

        let (train_points, train_targets): (Vec<Point>, Vec<f64>) = (0..n)
            .filter(|row| !held_out.contains(row))
            .map(|row| (points[row], targets[row]))
            .unzip();

        let model = KnnRegressor::fit(train_points, train_targets, n_neighbors, metric)?;
        let predicted = model.predict_many(&points[held_out.clone()]);
        scores.push(rmse(&targets[held_out], &predicted));
    }

    Ok(scores)
}
