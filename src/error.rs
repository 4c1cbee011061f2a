//! Error types and handling for `SpeedMap`

use thiserror::Error;

/// Main error type for location records and neighbour models
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeedMapError {
    /// A numeric field received a value that is not a number
    #[error("Invalid type: {message}")]
    InvalidType { message: String },

    /// Latitude or longitude outside the valid radian range
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// A model was constructed from zero locations
    #[error("Empty dataset: {message}")]
    EmptyDataset { message: String },

    /// Nonsensical hyperparameter or measurement value
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The numerical fit could not be completed
    #[error("Training failed: {message}")]
    TrainingFailed { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SpeedMapError {
    /// Create a new type error
    pub fn invalid_type<S: Into<String>>(message: S) -> Self {
        Self::InvalidType {
            message: message.into(),
        }
    }

    /// Create a new coordinate error
    pub fn invalid_coordinate<S: Into<String>>(message: S) -> Self {
        Self::InvalidCoordinate {
            message: message.into(),
        }
    }

    /// Create a new empty dataset error
    pub fn empty_dataset<S: Into<String>>(message: S) -> Self {
        Self::EmptyDataset {
            message: message.into(),
        }
    }

    /// Create a new parameter error
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a new training error
    pub fn training_failed<S: Into<String>>(message: S) -> Self {
        Self::TrainingFailed {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SpeedMapError::InvalidType { message } => {
                format!("A measurement is not a number: {message}")
            }
            SpeedMapError::InvalidCoordinate { message } => {
                format!("Coordinates are out of range: {message}")
            }
            SpeedMapError::EmptyDataset { .. } => {
                "No speed-test locations available. Load some measurements first.".to_string()
            }
            SpeedMapError::InvalidParameter { message } => {
                format!("Invalid model setting: {message}")
            }
            SpeedMapError::TrainingFailed { .. } => {
                "The prediction model could not be trained on this data.".to_string()
            }
            SpeedMapError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SpeedMapError::invalid_type("upload");
        assert!(matches!(err, SpeedMapError::InvalidType { .. }));

        let err = SpeedMapError::invalid_coordinate("latitude 4.0");
        assert!(matches!(err, SpeedMapError::InvalidCoordinate { .. }));

        let err = SpeedMapError::empty_dataset("no rows");
        assert!(matches!(err, SpeedMapError::EmptyDataset { .. }));

        let err = SpeedMapError::training_failed("nan");
        assert!(matches!(err, SpeedMapError::TrainingFailed { .. }));
    }

    #[test]
    fn test_display_includes_message() {
        let err = SpeedMapError::invalid_parameter("n_neighbors must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: n_neighbors must be at least 1"
        );
    }

    #[test]
    fn test_user_messages() {
        let err = SpeedMapError::empty_dataset("test");
        assert!(err.user_message().contains("No speed-test locations"));

        let err = SpeedMapError::invalid_parameter("k too large");
        assert!(err.user_message().contains("k too large"));

        let err = SpeedMapError::config("test");
        assert!(err.user_message().contains("Configuration error"));
    }
}
