//! Error types for dataset analysis and cleaning.
//!
//! Every public operation in this crate returns [`Result<T>`], whose error
//! side is [`ProcessingError`]. Errors carry a stable string code (see
//! [`ProcessingError::error_code`]) and map onto the coarse [`ErrorKind`]
//! taxonomy shared with the training crate.
//!
//! Errors serialize as `{ "code": ..., "message": ... }` so a front end can
//! render them without matching on Rust types.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// Coarse failure category used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed request: unknown columns, bad method names, empty selections.
    Validation,
    /// The dataset could not be resolved or read.
    DataAccess,
    /// Not enough usable rows for the requested operation.
    InsufficientData,
    /// Numerical failure inside an algorithm.
    Computation,
}

/// The main error type for analysis and cleaning operations.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Generic request validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more requested columns do not exist in the dataset.
    #[error("Missing columns: [{}]", .0.join(", "))]
    ColumnsNotFound(Vec<String>),

    /// The cleaning method name is not recognised.
    #[error("Unknown cleaning method: {0}")]
    UnsupportedCleaningMethod(String),

    /// The dataset has no columns to analyse.
    #[error("Dataset has no columns to analyze")]
    EmptyDataset,

    /// Invalid analysis configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// The dataset could not be resolved or read.
    #[error("Failed to access dataset: {0}")]
    DataAccess(String),

    /// Numerical failure.
    #[error("Computation failed: {0}")]
    Computation(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ColumnsNotFound(_) => "COLUMNS_NOT_FOUND",
            Self::UnsupportedCleaningMethod(_) => "UNSUPPORTED_CLEANING_METHOD",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::DataAccess(_) => "DATA_ACCESS_ERROR",
            Self::Computation(_) => "COMPUTATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Map the error onto the shared failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::ColumnsNotFound(_)
            | Self::UnsupportedCleaningMethod(_)
            | Self::EmptyDataset
            | Self::InvalidConfig(_) => ErrorKind::Validation,
            Self::DataAccess(_) | Self::Io(_) | Self::Json(_) => ErrorKind::DataAccess,
            Self::Computation(_) | Self::Polars(_) => ErrorKind::Computation,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Check if the caller can fix this error by changing the request.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}
