//! Configuration for the data-quality analysis.
//!
//! All thresholds are overridable defaults. Use [`AnalysisConfig::builder()`]
//! for a fluent, validated setup.

use serde::{Deserialize, Serialize};

/// Thresholds used by the outlier detectors and the recommendation engine.
///
/// # Example
///
/// ```rust,ignore
/// use datasmith_processing::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .iqr_multiplier(3.0)
///     .zscore_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Multiplier `k` for the IQR fences `[Q1 - k*IQR, Q3 + k*IQR]`.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Absolute z-score above which a value is an outlier.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Minimum number of non-missing values before the IQR detector runs.
    /// Default: 4
    pub min_iqr_values: usize,

    /// Overall missing percentage above which the "high missing" advice fires.
    /// Default: 30.0
    pub high_missing_threshold: f64,

    /// Overall missing percentage above which the "moderate missing" advice fires.
    /// Default: 10.0
    pub moderate_missing_threshold: f64,

    /// Duplicate-row percentage above which duplicate removal is advised.
    /// Default: 5.0
    pub duplicate_threshold: f64,

    /// IQR outlier percentage above which outlier review is advised.
    /// Default: 5.0
    pub outlier_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
            min_iqr_values: 4,
            high_missing_threshold: 30.0,
            moderate_missing_threshold: 10.0,
            duplicate_threshold: 5.0,
            outlier_threshold: 5.0,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.iqr_multiplier > 0.0 && self.iqr_multiplier.is_finite()) {
            return Err(ConfigValidationError::NonPositive {
                field: "iqr_multiplier".to_string(),
                value: self.iqr_multiplier,
            });
        }

        if !(self.zscore_threshold > 0.0 && self.zscore_threshold.is_finite()) {
            return Err(ConfigValidationError::NonPositive {
                field: "zscore_threshold".to_string(),
                value: self.zscore_threshold,
            });
        }

        for (field, value) in [
            ("high_missing_threshold", self.high_missing_threshold),
            ("moderate_missing_threshold", self.moderate_missing_threshold),
            ("duplicate_threshold", self.duplicate_threshold),
            ("outlier_threshold", self.outlier_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigValidationError::InvalidPercentage {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.moderate_missing_threshold > self.high_missing_threshold {
            return Err(ConfigValidationError::InvertedMissingThresholds {
                moderate: self.moderate_missing_threshold,
                high: self.high_missing_threshold,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be a positive number)")]
    NonPositive { field: String, value: f64 },

    #[error("Invalid percentage for '{field}': {value} (must be between 0 and 100)")]
    InvalidPercentage { field: String, value: f64 },

    #[error(
        "moderate_missing_threshold ({moderate}) must not exceed high_missing_threshold ({high})"
    )]
    InvertedMissingThresholds { moderate: f64, high: f64 },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    iqr_multiplier: Option<f64>,
    zscore_threshold: Option<f64>,
    min_iqr_values: Option<usize>,
    high_missing_threshold: Option<f64>,
    moderate_missing_threshold: Option<f64>,
    duplicate_threshold: Option<f64>,
    outlier_threshold: Option<f64>,
}

impl AnalysisConfigBuilder {
    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Set the absolute z-score cutoff.
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Set the minimum number of values needed by the IQR detector.
    pub fn min_iqr_values(mut self, n: usize) -> Self {
        self.min_iqr_values = Some(n);
        self
    }

    /// Set the "high missing data" percentage.
    pub fn high_missing_threshold(mut self, pct: f64) -> Self {
        self.high_missing_threshold = Some(pct);
        self
    }

    /// Set the "moderate missing data" percentage.
    pub fn moderate_missing_threshold(mut self, pct: f64) -> Self {
        self.moderate_missing_threshold = Some(pct);
        self
    }

    /// Set the duplicate-row percentage.
    pub fn duplicate_threshold(mut self, pct: f64) -> Self {
        self.duplicate_threshold = Some(pct);
        self
    }

    /// Set the outlier percentage.
    pub fn outlier_threshold(mut self, pct: f64) -> Self {
        self.outlier_threshold = Some(pct);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            min_iqr_values: self.min_iqr_values.unwrap_or(defaults.min_iqr_values),
            high_missing_threshold: self
                .high_missing_threshold
                .unwrap_or(defaults.high_missing_threshold),
            moderate_missing_threshold: self
                .moderate_missing_threshold
                .unwrap_or(defaults.moderate_missing_threshold),
            duplicate_threshold: self
                .duplicate_threshold
                .unwrap_or(defaults.duplicate_threshold),
            outlier_threshold: self.outlier_threshold.unwrap_or(defaults.outlier_threshold),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.zscore_threshold, 3.0);
        assert_eq!(config.min_iqr_values, 4);
        assert_eq!(config.high_missing_threshold, 30.0);
        assert_eq!(config.moderate_missing_threshold, 10.0);
    }

    #[test]
    fn test_builder_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .iqr_multiplier(3.0)
            .zscore_threshold(2.0)
            .duplicate_threshold(1.0)
            .build()
            .unwrap();

        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.zscore_threshold, 2.0);
        assert_eq!(config.duplicate_threshold, 1.0);
        assert_eq!(config.outlier_threshold, 5.0);
    }

    #[test]
    fn test_validation_rejects_non_positive_multiplier() {
        let result = AnalysisConfig::builder().iqr_multiplier(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::NonPositive { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_percentage_out_of_range() {
        let result = AnalysisConfig::builder().outlier_threshold(150.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPercentage { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_missing_thresholds() {
        let result = AnalysisConfig::builder()
            .moderate_missing_threshold(40.0)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvertedMissingThresholds { .. }
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"zscore_threshold": 2.5}"#)
            .expect("partial JSON should fill defaults");
        assert_eq!(config.zscore_threshold, 2.5);
        assert_eq!(config.iqr_multiplier, 1.5);
    }
}
