//! Configuration management for `SpeedMap`
//!
//! Handles loading configuration from files and environment variables,
//! and validates model and logging settings.

use crate::SpeedMapError;
use crate::neighbors::{DistanceMetric, ModelOptions};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeedMapConfig {
    /// Neighbour model hyperparameters
    #[serde(default)]
    pub model: ModelConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Neighbour model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Neighbours averaged per prediction
    #[serde(default = "default_n_neighbors")]
    pub n_neighbors: usize,
    /// `great_circle` or `euclidean`
    #[serde(default)]
    pub distance_mode: DistanceMetric,
    /// Whether coordinates are given in radians
    #[serde(default)]
    pub coordinates_are_radians: bool,
    /// Held-out share of the dataset
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed of the train/test shuffle
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_n_neighbors() -> usize {
    5
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_random_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_neighbors: default_n_neighbors(),
            distance_mode: DistanceMetric::default(),
            coordinates_are_radians: false,
            test_fraction: default_test_fraction(),
            random_seed: default_random_seed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl From<&ModelConfig> for ModelOptions {
    fn from(config: &ModelConfig) -> Self {
        ModelOptions::default()
            .with_n_neighbors(config.n_neighbors)
            .with_distance_mode(config.distance_mode)
            .with_coordinates_are_radians(config.coordinates_are_radians)
            .with_test_fraction(config.test_fraction)
            .with_random_seed(config.random_seed)
    }
}

impl SpeedMapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SPEEDMAP_MODEL__N_NEIGHBORS=7 overrides model.n_neighbors
        builder = builder.add_source(
            Environment::with_prefix("SPEEDMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SpeedMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("speedmap").join("config.toml"))
    }

    /// Apply default values to empty string fields
    pub fn apply_defaults(&mut self) {
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_model()?;
        self.validate_logging()?;
        Ok(())
    }

    fn validate_model(&self) -> Result<()> {
        if self.model.n_neighbors == 0 {
            return Err(SpeedMapError::config("model.n_neighbors must be at least 1").into());
        }

        if self.model.n_neighbors > 1000 {
            return Err(SpeedMapError::config("model.n_neighbors cannot exceed 1000").into());
        }

        if !(self.model.test_fraction > 0.0 && self.model.test_fraction < 1.0) {
            return Err(SpeedMapError::config(format!(
                "model.test_fraction must lie in (0, 1), got {}",
                self.model.test_fraction
            ))
            .into());
        }

        Ok(())
    }

    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SpeedMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SpeedMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
