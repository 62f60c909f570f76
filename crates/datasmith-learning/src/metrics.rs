//! Regression metrics and prediction samples.

use crate::types::{PredictionSample, RegressionMetrics};
use ndarray::ArrayView1;

/// Mean squared error; 0 for empty input.
pub fn mean_squared_error(actual: ArrayView1<f64>, predicted: ArrayView1<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Mean absolute error; 0 for empty input.
pub fn mean_absolute_error(actual: ArrayView1<f64>, predicted: ArrayView1<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination.
///
/// With constant actuals the score is 1.0 for perfect predictions and 0.0
/// otherwise.
pub fn r2_score(actual: ArrayView1<f64>, predicted: ArrayView1<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.sum() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// MSE, RMSE, MAE and R² for one partition.
pub fn regression_metrics(actual: ArrayView1<f64>, predicted: ArrayView1<f64>) -> RegressionMetrics {
    let mse = mean_squared_error(actual, predicted);
    RegressionMetrics {
        mse,
        rmse: mse.sqrt(),
        mae: mean_absolute_error(actual, predicted),
        r2: r2_score(actual, predicted),
    }
}

/// The first `limit` predictions, in order, with signed and percentage error.
pub fn prediction_samples(
    actual: ArrayView1<f64>,
    predicted: ArrayView1<f64>,
    limit: usize,
    error_floor: f64,
) -> Vec<PredictionSample> {
    actual
        .iter()
        .zip(predicted.iter())
        .take(limit)
        .map(|(&actual, &predicted)| {
            let error = actual - predicted;
            PredictionSample {
                actual,
                predicted,
                error,
                error_percentage: error.abs() / actual.abs().max(error_floor) * 100.0,
            }
        })
        .collect()
}
