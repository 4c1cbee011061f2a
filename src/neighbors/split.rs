//! Seeded train/test partitioning of row indices

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{Result, SpeedMapError};

/// Row indices of the training and held-out partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl TrainTestSplit {
    /// Shuffle `0..n` with a seeded RNG and hold out `round(n * test_fraction)` rows.
    ///
    /// Halves round away from zero, so 10 rows at 0.25 hold out 3.
    /// The same seed and length always give the same partition.
    pub fn new(n: usize, test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(SpeedMapError::invalid_parameter(format!(
                "test_fraction must lie in (0, 1), got {test_fraction}"
            )));
        }

        let mut rows: Vec<usize> = (0..n).collect();
        rows.shuffle(&mut StdRng::seed_from_u64(seed));

        let test_size = ((n as f64) * test_fraction).round() as usize;
        let train = rows.split_off(test_size.min(n));

        Ok(Self { train, test: rows })
    }

    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }
}
