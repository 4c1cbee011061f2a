//! Brute-force k-nearest-neighbour regression with inverse-distance weights

use crate::neighbors::metric::{DistanceMetric, Point};
use crate::{Result, SpeedMapError};

/// Exhaustive neighbour index over a fixed set of points
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    points: Vec<Point>,
    metric: DistanceMetric,
}

impl NeighborIndex {
    #[must_use]
    pub fn new(points: Vec<Point>, metric: DistanceMetric) -> Self {
        Self { points, metric }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Up to `k` `(row, distance)` pairs ordered nearest first.
    ///
    /// Equal distances keep the lower row first.
    #[must_use]
    pub fn kneighbors(&self, query: Point, k: usize) -> Vec<(usize, f64)> {
        let mut scored: Vec<(usize, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(row, &point)| (row, self.metric.distance(query, point)))
            .collect();

        // stable sort, ties stay in row order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        scored
    }
}

/// KNN regressor for a single target variable
#[derive(Debug, Clone)]
pub struct KnnRegressor {
    index: NeighborIndex,
    targets: Vec<f64>,
    n_neighbors: usize,
}

impl KnnRegressor {
    /// Fit on `points` and `targets` taken row for row.
    ///
    /// # Errors
    ///
    /// * `InvalidParameter` if the inputs differ in length, are empty, or
    ///   `n_neighbors` is zero or larger than the number of rows
    /// * `TrainingFailed` if a feature or target is not finite
    pub fn fit(
        points: Vec<Point>,
        targets: Vec<f64>,
        n_neighbors: usize,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if points.len() != targets.len() {
            return Err(SpeedMapError::invalid_parameter(format!(
                "{} feature rows but {} targets",
                points.len(),
                targets.len()
            )));
        }
        if points.is_empty() {
            return Err(SpeedMapError::invalid_parameter(
                "cannot fit a regressor on zero rows",
            ));
        }
        if n_neighbors == 0 || n_neighbors > points.len() {
            return Err(SpeedMapError::invalid_parameter(format!(
                "n_neighbors must be in 1..={}, got {n_neighbors}",
                points.len()
            )));
        }

        if let Some(row) = points.iter().position(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(SpeedMapError::training_failed(format!(
                "feature row {row} is not finite"
            )));
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            return Err(SpeedMapError::training_failed(format!(
                "target row {row} is not finite"
            )));
        }

        Ok(Self {
            index: NeighborIndex::new(points, metric),
            targets,
            n_neighbors,
        })
    }

    #[must_use]
    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// The `n_neighbors` closest training rows to `query`
    #[must_use]
    pub fn kneighbors(&self, query: Point) -> Vec<(usize, f64)> {
        self.index.kneighbors(query, self.n_neighbors)
    }

    #[must_use]
    pub fn predict(&self, query: Point) -> f64 {
        let neighbors = self.kneighbors(query);
        self.weighted_average(&neighbors)
    }

    #[must_use]
    pub fn predict_many(&self, queries: &[Point]) -> Vec<f64> {
        queries.iter().map(|&q| self.predict(q)).collect()
    }

    fn weighted_average(&self, neighbors: &[(usize, f64)]) -> f64 {
        // a neighbour sitting on the query takes all the weight
        let exact: Vec<f64> = neighbors
            .iter()
            .filter(|(_, d)| !(1.0 / d).is_finite())
            .map(|&(row, _)| self.targets[row])
            .collect();
        if !exact.is_empty() {
            return exact.iter().sum::<f64>() / exact.len() as f64;
        }

        let (weighted, total) = neighbors
            .iter()
            .fold((0.0, 0.0), |(weighted, total), &(row, d)| {
                let w = 1.0 / d;
                (weighted + w * self.targets[row], total + w)
            });
        weighted / total
    }
}
