//! Training pipeline implementation.
//!
//! [`ModelTrainer`] runs one regression training request end to end:
//!
//! 1. **Validation** - Check the request before touching the dataset
//! 2. **Preparation** - Select, clean and encode the columns
//! 3. **Split** - Seeded shuffle into training and test partitions
//! 4. **Scaling** - Standardize features with training statistics only
//! 5. **Fitting** - Fit the requested model on the scaled training rows
//! 6. **Evaluation** - Metrics, prediction samples and feature importance
//!
//! # Example
//!
//! ```rust,ignore
//! use datasmith_learning::{ModelTrainer, TrainingConfig, TrainingRequest};
//!
//! let trainer = ModelTrainer::new(TrainingConfig::default());
//! let request = TrainingRequest::new(["area", "rooms"], "price", "random_forest");
//! let report = trainer.train(&df, &request)?;
//! println!("test R2: {:.3}", report.metrics.test.r2);
//! ```

use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::metrics::{prediction_samples, regression_metrics};
use crate::model::Model;
use crate::preparation::FeaturePreparer;
use crate::scaler::StandardScaler;
use crate::types::{ModelKind, PartitionMetrics, TrainingReport, TrainingRequest};
use ndarray::{Array1, Axis};
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Trains regression models according to a [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train the requested model on `df` and evaluate it.
    ///
    /// # Errors
    ///
    /// - [`LearningError::Validation`] / [`LearningError::TargetInFeatures`] for
    ///   malformed requests, raised before the dataset is read
    /// - [`LearningError::UnsupportedModel`] for unknown model kinds
    /// - [`LearningError::ColumnsNotFound`] for absent columns
    /// - [`LearningError::InsufficientData`] when fewer than `min_rows`
    ///   complete rows remain
    /// - [`LearningError::Computation`] for numerical failures
    pub fn train(&self, df: &DataFrame, request: &TrainingRequest) -> Result<TrainingReport> {
        let start = Instant::now();

        self.config.validate()?;
        validate_request(request)?;
        let kind: ModelKind = request.model_type.parse()?;

        info!(
            "Training {} on {} features to predict '{}'",
            kind,
            request.features.len(),
            request.target
        );

        let prepared = FeaturePreparer::prepare(df, &request.features, &request.target)?;
        if prepared.retained_rows < self.config.min_rows {
            return Err(LearningError::InsufficientData {
                actual: prepared.retained_rows,
                required: self.config.min_rows,
            });
        }

        let mut warnings = Vec::new();
        if prepared.dropped_rows() > 0 {
            let message = format!(
                "Dropped {} of {} rows with missing values",
                prepared.dropped_rows(),
                prepared.original_rows
            );
            warn!("{}", message);
            warnings.push(message);
        }

        let (train_idx, test_idx) = self.split_indices(prepared.retained_rows);
        debug!(
            "Split {} rows into {} train / {} test",
            prepared.retained_rows,
            train_idx.len(),
            test_idx.len()
        );

        let x_train_raw = prepared.features.select(Axis(0), &train_idx);
        let x_test_raw = prepared.features.select(Axis(0), &test_idx);
        let y_train: Array1<f64> = prepared.target.select(Axis(0), &train_idx);
        let y_test: Array1<f64> = prepared.target.select(Axis(0), &test_idx);

        if y_train.iter().chain(y_test.iter()).any(|v| !v.is_finite()) {
            return Err(LearningError::Computation(format!(
                "Target column '{}' contains non-finite values",
                request.target
            )));
        }

        let scaler = StandardScaler::fit(x_train_raw.view())?;
        let x_train = scaler.transform(x_train_raw.view())?;
        let x_test = scaler.transform(x_test_raw.view())?;

        let mut model = Model::for_kind(kind, &self.config);
        model.fit(x_train.view(), y_train.view())?;
        for message in model.fit_warnings() {
            warn!("{}", message);
            warnings.push(message);
        }

        let train_pred = model.predict(x_train.view())?;
        let test_pred = model.predict(x_test.view())?;

        let metrics = PartitionMetrics {
            train: regression_metrics(y_train.view(), train_pred.view()),
            test: regression_metrics(y_test.view(), test_pred.view()),
        };
        let predictions = prediction_samples(
            y_test.view(),
            test_pred.view(),
            self.config.max_prediction_samples,
            self.config.error_floor,
        );

        let feature_importance = model
            .feature_importances()
            .map(|importances| rank_importances(&prepared.feature_names, importances));

        let training_time_seconds = start.elapsed().as_secs_f64();
        info!(
            "Trained {} in {:.3}s (test R2 = {:.4}, test RMSE = {:.4})",
            kind, training_time_seconds, metrics.test.r2, metrics.test.rmse
        );

        Ok(TrainingReport {
            model_type: kind,
            training_samples: train_idx.len(),
            test_samples: test_idx.len(),
            metrics,
            predictions,
            feature_importance,
            training_time_seconds,
            warnings,
        })
    }

    /// Seeded shuffle of `0..n`; the first `ceil(n * test_size)` indices
    /// form the test partition.
    fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_seed);
        indices.shuffle(&mut rng);

        let n_test = ((n as f64 * self.config.test_size).ceil() as usize)
            .min(n.saturating_sub(1))
            .max(1);
        let train = indices.split_off(n_test);
        (train, indices)
    }
}

fn validate_request(request: &TrainingRequest) -> Result<()> {
    if request.features.is_empty() {
        return Err(LearningError::Validation(
            "At least one feature column is required".to_string(),
        ));
    }
    if request.target.trim().is_empty() {
        return Err(LearningError::Validation(
            "A target column is required".to_string(),
        ));
    }
    if request.features.contains(&request.target) {
        return Err(LearningError::TargetInFeatures(request.target.clone()));
    }

    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = request
        .features
        .iter()
        .filter(|f| !seen.insert(f.as_str()))
        .map(String::as_str)
        .collect();
    if !duplicates.is_empty() {
        return Err(LearningError::Validation(format!(
            "Duplicate feature columns: [{}]",
            duplicates.join(", ")
        )));
    }
    Ok(())
}

/// Pair importances with feature names, most important first. Ties keep
/// feature order.
fn rank_importances(names: &[String], importances: &Array1<f64>) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = names
        .iter()
        .cloned()
        .zip(importances.iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn trainer() -> ModelTrainer {
        ModelTrainer::new(TrainingConfig::default())
    }

    // ==================== split tests ====================

    #[test]
    fn test_split_sizes() {
        let (train, test) = trainer().split_indices(10);
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);

        let (train, test) = trainer().split_indices(11);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_a_partition() {
        let (train, test) = trainer().split_indices(25);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(trainer().split_indices(50), trainer().split_indices(50));
    }

    #[test]
    fn test_split_depends_on_seed() {
        let other = ModelTrainer::new(TrainingConfig::builder().random_seed(7).build().unwrap());
        assert_ne!(trainer().split_indices(50), other.split_indices(50));
    }

    // ==================== request validation tests ====================

    #[test]
    fn test_empty_features_rejected() {
        let request = TrainingRequest::new(Vec::<String>::new(), "y", "svm");
        assert!(matches!(validate_request(&request), Err(LearningError::Validation(_))));
    }

    #[test]
    fn test_empty_target_rejected() {
        let request = TrainingRequest::new(["a"], " ", "svm");
        assert!(matches!(validate_request(&request), Err(LearningError::Validation(_))));
    }

    #[test]
    fn test_duplicate_features_rejected() {
        let request = TrainingRequest::new(["a", "b", "a"], "y", "svm");
        let err = validate_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate feature columns: [a]");
    }

    #[test]
    fn test_target_in_features_rejected() {
        let request = TrainingRequest::new(["a", "y"], "y", "svm");
        assert!(matches!(
            validate_request(&request),
            Err(LearningError::TargetInFeatures(_))
        ));
    }

    // ==================== ranking tests ====================

    #[test]
    fn test_rank_importances_descending_and_stable() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ranked = rank_importances(&names, &array![0.25, 0.5, 0.25]);
        assert_eq!(
            ranked,
            vec![
                ("b".to_string(), 0.5),
                ("a".to_string(), 0.25),
                ("c".to_string(), 0.25)
            ]
        );
    }
}
