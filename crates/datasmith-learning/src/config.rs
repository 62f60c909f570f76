//! Configuration for the regression training pipeline.
//!
//! # Example
//!
//! ```
//! use datasmith_learning::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .test_size(0.25)
//!     .random_seed(7)
//!     .n_estimators(50)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::LearningError;
use serde::{Deserialize, Serialize};

/// Configuration for [`ModelTrainer`](crate::ModelTrainer).
///
/// # Validation
///
/// The builder validates the following constraints on [`build()`](TrainingConfigBuilder::build):
/// - `test_size` must be in range `(0.0, 1.0)` (exclusive)
/// - `min_rows` must be at least 2
/// - `n_estimators` must be at least 1
/// - `svm_c`, `svm_tol` and `error_floor` must be positive
/// - `svm_epsilon` must not be negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of retained rows held out for testing (default: 0.2).
    ///
    /// The test partition has `ceil(n * test_size)` rows.
    pub test_size: f64,

    /// Seed for the train/test shuffle and the forest's bootstraps (default: 42).
    ///
    /// Identical inputs with the same seed give bit-identical reports.
    pub random_seed: u64,

    /// Minimum number of complete rows needed to train (default: 10).
    pub min_rows: usize,

    /// Maximum number of test predictions echoed in the report (default: 20).
    pub max_prediction_samples: usize,

    /// Lower bound on `|actual|` when computing percentage error (default: 0.001).
    pub error_floor: f64,

    /// Number of trees in the random forest (default: 100).
    pub n_estimators: usize,

    /// Regularization strength of the support vector regressor (default: 100.0).
    pub svm_c: f64,

    /// Width of the epsilon-insensitive tube (default: 0.1).
    pub svm_epsilon: f64,

    /// Maximum coordinate-descent sweeps for the SVM solver (default: 1000).
    pub svm_max_iter: usize,

    /// Convergence tolerance for the SVM solver (default: 1e-3).
    pub svm_tol: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 42,
            min_rows: 10,
            max_prediction_samples: 20,
            error_floor: 0.001,
            n_estimators: 100,
            svm_c: 100.0,
            svm_epsilon: 0.1,
            svm_max_iter: 1000,
            svm_tol: 1e-3,
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check every constraint listed on the type.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] naming the first violated field.
    pub fn validate(&self) -> Result<(), LearningError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(LearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        if self.min_rows < 2 {
            return Err(LearningError::InvalidConfig(
                "min_rows must be at least 2".to_string(),
            ));
        }

        if self.n_estimators == 0 {
            return Err(LearningError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if !(self.svm_c > 0.0) {
            return Err(LearningError::InvalidConfig(
                "svm_c must be positive".to_string(),
            ));
        }

        if !(self.svm_epsilon >= 0.0) {
            return Err(LearningError::InvalidConfig(
                "svm_epsilon must not be negative".to_string(),
            ));
        }

        if !(self.svm_tol > 0.0) {
            return Err(LearningError::InvalidConfig(
                "svm_tol must be positive".to_string(),
            ));
        }

        if !(self.error_floor > 0.0) {
            return Err(LearningError::InvalidConfig(
                "error_floor must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
///
/// Created via [`TrainingConfig::builder()`]. All setters return `self` to allow
/// method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the test size fraction (default: 0.2).
    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    /// Set the random seed for reproducibility (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the minimum number of complete rows (default: 10).
    #[must_use]
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.config.min_rows = rows;
        self
    }

    /// Set how many test predictions the report echoes (default: 20).
    #[must_use]
    pub fn max_prediction_samples(mut self, samples: usize) -> Self {
        self.config.max_prediction_samples = samples;
        self
    }

    /// Set the percentage-error floor (default: 0.001).
    #[must_use]
    pub fn error_floor(mut self, floor: f64) -> Self {
        self.config.error_floor = floor;
        self
    }

    /// Set the number of forest trees (default: 100).
    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n;
        self
    }

    /// Set the SVM regularization strength (default: 100.0).
    #[must_use]
    pub fn svm_c(mut self, c: f64) -> Self {
        self.config.svm_c = c;
        self
    }

    /// Set the SVM epsilon tube width (default: 0.1).
    #[must_use]
    pub fn svm_epsilon(mut self, epsilon: f64) -> Self {
        self.config.svm_epsilon = epsilon;
        self
    }

    /// Set the SVM sweep limit (default: 1000).
    #[must_use]
    pub fn svm_max_iter(mut self, iterations: usize) -> Self {
        self.config.svm_max_iter = iterations;
        self
    }

    /// Set the SVM convergence tolerance (default: 1e-3).
    #[must_use]
    pub fn svm_tol(mut self, tol: f64) -> Self {
        self.config.svm_tol = tol;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if any constraint listed on
    /// [`TrainingConfig`] is violated.
    pub fn build(self) -> Result<TrainingConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.min_rows, 10);
        assert_eq!(config.max_prediction_samples, 20);
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.svm_c, 100.0);
    }

    #[test]
    fn test_builder_valid() {
        let config = TrainingConfig::builder()
            .test_size(0.3)
            .random_seed(7)
            .n_estimators(10)
            .build()
            .unwrap();
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.n_estimators, 10);
    }

    #[test]
    fn test_builder_invalid_test_size() {
        for size in [0.0, 1.0, -0.1, f64::NAN] {
            let result = TrainingConfig::builder().test_size(size).build();
            assert!(matches!(result, Err(LearningError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_builder_invalid_min_rows() {
        let result = TrainingConfig::builder().min_rows(1).build();
        assert!(matches!(result, Err(LearningError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_invalid_estimators() {
        let result = TrainingConfig::builder().n_estimators(0).build();
        assert!(matches!(result, Err(LearningError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_invalid_svm_params() {
        assert!(TrainingConfig::builder().svm_c(0.0).build().is_err());
        assert!(TrainingConfig::builder().svm_epsilon(-1.0).build().is_err());
        assert!(TrainingConfig::builder().svm_tol(0.0).build().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: TrainingConfig = serde_json::from_str(r#"{"random_seed": 1}"#).unwrap();
        assert_eq!(config.random_seed, 1);
        assert_eq!(config.test_size, 0.2);
        assert!(config.validate().is_ok());
    }
}
