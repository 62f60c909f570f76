//! Standard scaling of feature matrices.

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Column-wise `(x - mean) / std` with the population standard deviation.
///
/// Columns with zero spread get a scale of 1 so they pass through centered.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit on `x`, which must contain only finite values.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self> {
        if let Some((row, col)) = x
            .indexed_iter()
            .find_map(|((r, c), v)| (!v.is_finite()).then_some((r, c)))
        {
            return Err(LearningError::Computation(format!(
                "Non-finite feature value at row {row}, column {col}"
            )));
        }

        if x.nrows() == 0 {
            return Err(LearningError::Computation(
                "Cannot fit a scaler on zero rows".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 0.0 { s } else { 1.0 });

        Ok(Self { mean, scale })
    }

    /// Apply the fitted transform.
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(LearningError::Computation(format!(
                "Scaler fitted on {} features, got {}",
                self.mean.len(),
                x.ncols()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(LearningError::Computation(
                "Non-finite feature value in data to scale".to_string(),
            ));
        }
        Ok((&x - &self.mean) / &self.scale)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_centers_and_scales() {
        let x = array![[1.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();

        assert_eq!(scaler.mean(), &array![2.0, 10.0]);
        // population std of [1, 3] is 1; constant column falls back to 1
        assert_eq!(scaler.scale(), &array![1.0, 1.0]);

        let scaled = scaler.transform(x.view()).unwrap();
        assert_eq!(scaled, array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_transform_uses_fitted_statistics() {
        let train = array![[0.0], [2.0]];
        let scaler = StandardScaler::fit(train.view()).unwrap();
        let scaled = scaler.transform(array![[4.0]].view()).unwrap();
        assert_eq!(scaled, array![[3.0]]);
    }

    #[test]
    fn test_infinite_values_are_rejected() {
        let x = array![[1.0], [f64::INFINITY]];
        let err = StandardScaler::fit(x.view()).unwrap_err();
        assert!(matches!(err, LearningError::Computation(_)));
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = StandardScaler::fit(array![[1.0, 2.0]].view()).unwrap();
        assert!(scaler.transform(array![[1.0]].view()).is_err());
    }
}
