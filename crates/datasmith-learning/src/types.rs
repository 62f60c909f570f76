//! Common types used throughout the datasmith-learning crate.
//!
//! # Overview
//!
//! - [`ModelKind`]: The closed set of supported regression models
//! - [`TrainingRequest`]: Feature columns, target column and model kind
//! - [`TrainingReport`]: Complete result from [`ModelTrainer::train()`](crate::ModelTrainer::train)
//! - [`RegressionMetrics`]: Error metrics for one partition
//! - [`PredictionSample`]: One echoed test prediction

use crate::error::LearningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported regression models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Ordinary least squares with an intercept.
    LinearRegression,
    /// Bagged ensemble of CART regression trees.
    RandomForest,
    /// Epsilon-insensitive support vector regression with an RBF kernel.
    Svm,
}

impl ModelKind {
    /// All supported kinds, in display order.
    pub const ALL: [ModelKind; 3] = [Self::LinearRegression, Self::RandomForest, Self::Svm];

    /// Wire name of the model kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinearRegression => "linear_regression",
            Self::RandomForest => "random_forest",
            Self::Svm => "svm",
        }
    }

    /// Whether fitted models of this kind report feature importances.
    pub fn has_feature_importance(&self) -> bool {
        matches!(self, Self::RandomForest)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = LearningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LearningError::UnsupportedModel(s.to_string()))
    }
}

/// A request to train one regression model.
///
/// `model_type` stays a string so that unknown kinds are reported as
/// [`LearningError::UnsupportedModel`] by the trainer rather than failing
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRequest {
    /// Feature column names, in the order they enter the model.
    pub features: Vec<String>,
    /// Target column name.
    pub target: String,
    /// One of `linear_regression`, `random_forest`, `svm`.
    pub model_type: String,
}

impl TrainingRequest {
    /// Build a request from anything string-like.
    pub fn new<I, S>(features: I, target: impl Into<String>, model_type: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            target: target.into(),
            model_type: model_type.into(),
        }
    }
}

/// Error metrics over one partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Metrics for both partitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetrics {
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
}

/// A single test-partition prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSample {
    pub actual: f64,
    pub predicted: f64,
    /// `actual - predicted`.
    pub error: f64,
    /// `|error| / max(|actual|, floor) * 100`.
    pub error_percentage: f64,
}

/// Result of a training run.
///
/// Returned by [`ModelTrainer::train()`](crate::ModelTrainer::train).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// The model kind that was fitted.
    pub model_type: ModelKind,

    /// Rows in the training partition.
    pub training_samples: usize,

    /// Rows in the test partition.
    pub test_samples: usize,

    /// Metrics on the training and test partitions.
    pub metrics: PartitionMetrics,

    /// Leading test predictions in partition order.
    ///
    /// At most `max_prediction_samples` entries; never re-sorted.
    pub predictions: Vec<PredictionSample>,

    /// Feature importance scores (feature name, importance).
    ///
    /// Sorted in descending order and normalized to sum to 1.0. `None` for
    /// models that do not expose importances.
    pub feature_importance: Option<Vec<(String, f64)>>,

    /// Wall-clock time spent preparing, fitting and evaluating.
    pub training_time_seconds: f64,

    /// Non-fatal warnings generated during training.
    pub warnings: Vec<String>,
}

static_assertions::assert_impl_all!(ModelKind: Send, Sync);
static_assertions::assert_impl_all!(TrainingRequest: Send, Sync);
static_assertions::assert_impl_all!(TrainingReport: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_round_trips_through_name() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.as_str().parse::<ModelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_model_kind() {
        let err = "xgboost".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, LearningError::UnsupportedModel(ref name) if name == "xgboost"));
    }

    #[test]
    fn test_model_kind_is_case_sensitive() {
        assert!("SVM".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_model_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ModelKind::RandomForest).unwrap();
        assert_eq!(json, "\"random_forest\"");
    }

    #[test]
    fn test_only_forest_has_importance() {
        assert!(ModelKind::RandomForest.has_feature_importance());
        assert!(!ModelKind::LinearRegression.has_feature_importance());
        assert!(!ModelKind::Svm.has_feature_importance());
    }

    #[test]
    fn test_request_from_json() {
        let request: TrainingRequest = serde_json::from_str(
            r#"{"features": ["a", "b"], "target": "y", "model_type": "svm"}"#,
        )
        .unwrap();
        assert_eq!(request, TrainingRequest::new(["a", "b"], "y", "svm"));
    }
}
