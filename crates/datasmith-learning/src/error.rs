//! Error types for the datasmith-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Error Handling
//!
//! Errors are designed to be:
//! - **Descriptive**: Each variant names the offending columns or values
//! - **Early**: Request problems are reported before any model is fitted
//! - **Classified**: [`LearningError::kind`] maps every variant onto the shared
//!   [`ErrorKind`] taxonomy
//!
//! # Example
//!
//! ```no_run
//! use datasmith_learning::{LearningError, TrainingConfig};
//!
//! fn configure() -> Result<TrainingConfig, LearningError> {
//!     let config = TrainingConfig::builder()
//!         .test_size(0.25)
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use datasmith_processing::{ErrorKind, ProcessingError};
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for training operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer.
    ///
    /// Check the error message for the offending field and accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The training request is malformed.
    ///
    /// Common causes:
    /// - No features or no target were given
    /// - A feature is listed twice
    #[error("{0}")]
    Validation(String),

    /// The target column also appears among the features.
    ///
    /// Training on the target would leak the answer into the inputs.
    #[error("Target variable cannot be in features: '{0}'")]
    TargetInFeatures(String),

    /// One or more requested columns are absent from the dataset.
    ///
    /// Every missing name is listed. Column names are case-sensitive.
    #[error("Missing columns: [{}]", .0.join(", "))]
    ColumnsNotFound(Vec<String>),

    /// The requested model kind is not supported.
    ///
    /// Supported kinds are `linear_regression`, `random_forest` and `svm`.
    #[error("Unknown model type: {0}")]
    UnsupportedModel(String),

    /// Too few complete rows remain after feature preparation.
    #[error("Not enough valid data to train (got {actual} rows, need at least {required})")]
    InsufficientData {
        /// Rows retained after dropping incomplete rows.
        actual: usize,
        /// Configured minimum.
        required: usize,
    },

    /// A numerical failure inside preparation, scaling or fitting.
    ///
    /// Common causes:
    /// - Infinite feature or target values
    /// - A singular design matrix that regularization could not repair
    /// - More samples than the kernel model accepts
    #[error("Computation failed: {0}")]
    Computation(String),

    /// Polars error while reading columns.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error raised by the processing crate.
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl LearningError {
    /// Get a stable error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TargetInFeatures(_) => "TARGET_IN_FEATURES",
            Self::ColumnsNotFound(_) => "COLUMNS_NOT_FOUND",
            Self::UnsupportedModel(_) => "UNSUPPORTED_MODEL",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::Computation(_) => "COMPUTATION_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Processing(e) => e.error_code(),
        }
    }

    /// Map the error onto the shared failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_)
            | Self::Validation(_)
            | Self::TargetInFeatures(_)
            | Self::ColumnsNotFound(_)
            | Self::UnsupportedModel(_) => ErrorKind::Validation,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::Computation(_) | Self::Polars(_) => ErrorKind::Computation,
            Self::Processing(e) => e.kind(),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("LearningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, LearningError>;
