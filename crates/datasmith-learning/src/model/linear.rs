//! Ordinary least squares with an intercept.

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Pivots smaller than this are treated as singular.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Relative size of the ridge added to a rank-deficient normal matrix.
const RIDGE_SCALE: f64 = 1e-8;

/// Linear regression solved through the normal equations.
///
/// The system is solved by Cholesky decomposition. When the normal matrix is
/// not positive definite the solver retries with a small ridge, then falls
/// back to Gauss-Jordan elimination with partial pivoting.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(LearningError::Computation(format!(
                "Feature rows ({}) and target length ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(LearningError::Computation(
                "Cannot fit a linear model on zero rows".to_string(),
            ));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = &x - &x_mean;
        let y_centered = &y - y_mean;

        let coefficients = solve_least_squares(&x_centered, &y_centered).ok_or_else(|| {
            LearningError::Computation("Normal equations are singular".to_string())
        })?;

        self.intercept = y_mean - x_mean.dot(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or_else(|| {
            LearningError::Computation("Linear model has not been fitted".to_string())
        })?;
        if x.ncols() != coefficients.len() {
            return Err(LearningError::Computation(format!(
                "Model expects {} features, got {}",
                coefficients.len(),
                x.ncols()
            )));
        }
        Ok(x.dot(coefficients) + self.intercept)
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Solve `(X^T X) w = X^T y`.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if let Some(w) = cholesky_solve(&xtx, &xty) {
        return Some(w);
    }

    let ridged = with_ridge(&xtx);
    cholesky_solve(&ridged, &xty)
        .or_else(|| gauss_jordan_solve(&xtx, &xty))
        .or_else(|| gauss_jordan_solve(&ridged, &xty))
}

fn with_ridge(a: &Array2<f64>) -> Array2<f64> {
    let n = a.nrows().max(1);
    let mean_diag = a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    let ridge = if mean_diag > 0.0 {
        RIDGE_SCALE * mean_diag
    } else {
        RIDGE_SCALE
    };

    let mut out = a.clone();
    out.diag_mut().mapv_inplace(|v| v + ridge);
    out
}

/// Cholesky solve of a symmetric positive-definite system.
///
/// Returns `None` when a pivot is not clearly positive relative to its
/// diagonal entry.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if !(diag > PIVOT_TOLERANCE * a[[i, i]].abs()) {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * w = z
    let mut w = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * w[j]).sum();
        w[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(w)
}

/// Gauss-Jordan elimination with partial pivoting on `[A | b]`.
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut aug = Array2::<f64>::zeros((n, n + 1));
    aug.slice_mut(ndarray::s![.., ..n]).assign(a);
    aug.column_mut(n).assign(b);

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&r1, &r2| {
            aug[[r1, col]].abs().total_cmp(&aug[[r2, col]].abs())
        })?;

        if pivot_row != col {
            for j in 0..=n {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        if pivot.abs() < PIVOT_TOLERANCE {
            return None;
        }
        aug.row_mut(col).mapv_inplace(|v| v / pivot);

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                if factor != 0.0 {
                    for j in 0..=n {
                        aug[[row, j]] -= factor * aug[[col, j]];
                    }
                }
            }
        }
    }

    Some(aug.column(n).to_owned())
}
