//! Epsilon-insensitive support vector regression with an RBF kernel.
//!
//! The dual problem is solved by cyclic coordinate descent. The bias is
//! absorbed into the kernel as `K(a, b) + 1`, which removes the equality
//! constraint and lets each coordinate be updated in closed form.
//!
//! Up to [`MAX_CACHED_KERNEL_SAMPLES`] training rows the whole kernel matrix
//! is computed once. Larger training sets compute kernel rows when a
//! coordinate first moves and keep a bounded number of them.

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Largest training set for which the full kernel matrix is materialized.
pub const MAX_CACHED_KERNEL_SAMPLES: usize = 10_000;

/// Memory budget for kernel rows kept between coordinate updates.
const KERNEL_ROW_CACHE_BYTES: usize = 256 * 1024 * 1024;

/// Dual coefficients at or below this magnitude do not make a support vector.
const SUPPORT_TOLERANCE: f64 = 1e-8;

/// Solver settings for [`SupportVectorRegressor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvrParams {
    pub c: f64,
    pub epsilon: f64,
    pub max_iter: usize,
    pub tol: f64,
}

#[derive(Debug, Clone)]
struct FittedSvr {
    support_vectors: Array2<f64>,
    dual_coef: Array1<f64>,
    gamma: f64,
}

#[derive(Debug, Clone)]
pub struct SupportVectorRegressor {
    params: SvrParams,
    max_cached_samples: usize,
    fitted: Option<FittedSvr>,
    converged: bool,
    iterations: usize,
}

impl SupportVectorRegressor {
    pub fn new(params: SvrParams) -> Self {
        Self {
            params,
            max_cached_samples: MAX_CACHED_KERNEL_SAMPLES,
            fitted: None,
            converged: false,
            iterations: 0,
        }
    }

    /// Materialize the kernel matrix only for training sets of at most
    /// `samples` rows.
    #[must_use]
    pub fn with_kernel_limit(mut self, samples: usize) -> Self {
        self.max_cached_samples = samples;
        self
    }

    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 || n_samples != y.len() {
            return Err(LearningError::Computation(format!(
                "SVM needs matching non-empty inputs (got {} rows and {} targets)",
                n_samples,
                y.len()
            )));
        }

        let gamma = scale_gamma(x);
        let mut kernel = Kernel::new(x, gamma, self.max_cached_samples)?;

        let SvrParams {
            c,
            epsilon,
            max_iter,
            tol,
        } = self.params;

        let mut beta = vec![0.0; n_samples];
        // f = K~ * beta
        let mut f = vec![0.0; n_samples];
        self.converged = false;
        self.iterations = 0;

        for _ in 0..max_iter {
            self.iterations += 1;
            let mut max_delta = 0.0f64;

            for i in 0..n_samples {
                let q_ii = kernel.diagonal(i);
                let z = beta[i] - (f[i] - y[i]) / q_ii;
                let updated = soft_threshold(z, epsilon / q_ii).clamp(-c, c);
                let delta = updated - beta[i];
                if delta == 0.0 {
                    continue;
                }

                beta[i] = updated;
                kernel.add_scaled_row(i, delta, &mut f);
                max_delta = max_delta.max(delta.abs());
            }

            if max_delta < tol {
                self.converged = true;
                break;
            }
        }

        let support: Vec<usize> = (0..n_samples)
            .filter(|&i| beta[i].abs() > SUPPORT_TOLERANCE)
            .collect();

        debug!(
            "SVR fitted on {} samples ({}) with gamma={:.6}, {} support vectors, {} sweeps (converged: {})",
            n_samples,
            kernel.describe(),
            gamma,
            support.len(),
            self.iterations,
            self.converged
        );

        self.fitted = Some(FittedSvr {
            support_vectors: x.select(Axis(0), &support),
            dual_coef: support.iter().map(|&i| beta[i]).collect(),
            gamma,
        });
        Ok(())
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| {
            LearningError::Computation("SVM has not been fitted".to_string())
        })?;
        if x.ncols() != fitted.support_vectors.ncols() {
            return Err(LearningError::Computation(format!(
                "SVM expects {} features, got {}",
                fitted.support_vectors.ncols(),
                x.ncols()
            )));
        }

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                fitted
                    .support_vectors
                    .rows()
                    .into_iter()
                    .zip(fitted.dual_coef.iter())
                    .map(|(sv, coef)| coef * (rbf(row, sv, fitted.gamma) + 1.0))
                    .sum()
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    /// Whether the last fit met the tolerance before `max_iter` sweeps.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn n_support(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.dual_coef.len())
    }

    pub fn gamma(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.gamma)
    }
}

/// `1 / (n_features * Var(X))` over every entry of `x`; 1.0 when the
/// variance is zero.
fn scale_gamma(x: ArrayView2<f64>) -> f64 {
    let variance = x.var(0.0);
    if variance > 0.0 && x.ncols() > 0 {
        1.0 / (x.ncols() as f64 * variance)
    } else {
        1.0
    }
}

fn rbf(a: ArrayView1<f64>, b: ArrayView1<f64>, gamma: f64) -> f64 {
    let norm_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
    (-gamma * norm_sq).exp()
}

/// `K(x_i, x_j) + 1` for every `j`.
fn augmented_kernel_row(x: ArrayView2<f64>, i: usize, gamma: f64) -> Vec<f64> {
    let row = x.row(i);
    (0..x.nrows())
        .into_par_iter()
        .map(|j| rbf(row, x.row(j), gamma) + 1.0)
        .collect()
}

/// `K(x_i, x_j) + 1` for every pair of rows.
fn augmented_kernel_matrix(x: ArrayView2<f64>, gamma: f64) -> Result<Array2<f64>> {
    let n = x.nrows();
    let data: Vec<f64> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| (0..n).map(move |j| rbf(x.row(i), x.row(j), gamma) + 1.0))
        .collect();
    Array2::from_shape_vec((n, n), data)
        .map_err(|e| LearningError::Computation(format!("Failed to build kernel matrix: {e}")))
}

/// Augmented kernel seen by the coordinate-descent loop.
enum Kernel<'a> {
    Matrix(Array2<f64>),
    Rows {
        x: ArrayView2<'a, f64>,
        gamma: f64,
        cache: KernelRowCache,
    },
}

impl<'a> Kernel<'a> {
    fn new(x: ArrayView2<'a, f64>, gamma: f64, max_cached_samples: usize) -> Result<Self> {
        let n = x.nrows();
        if n <= max_cached_samples {
            return Ok(Self::Matrix(augmented_kernel_matrix(x, gamma)?));
        }

        let capacity = (KERNEL_ROW_CACHE_BYTES / (n * size_of::<f64>())).max(1);
        Ok(Self::Rows {
            x,
            gamma,
            cache: KernelRowCache::new(capacity),
        })
    }

    fn diagonal(&self, i: usize) -> f64 {
        match self {
            Self::Matrix(matrix) => matrix[[i, i]],
            Self::Rows { x, gamma, .. } => rbf(x.row(i), x.row(i), *gamma) + 1.0,
        }
    }

    /// `f += delta * K~[i, :]`
    fn add_scaled_row(&mut self, i: usize, delta: f64, f: &mut [f64]) {
        match self {
            Self::Matrix(matrix) => {
                for (fj, kij) in f.iter_mut().zip(matrix.row(i)) {
                    *fj += delta * kij;
                }
            }
            Self::Rows { x, gamma, cache } => {
                let row = cache.get_or_compute(i, || augmented_kernel_row(*x, i, *gamma));
                for (fj, kij) in f.iter_mut().zip(row) {
                    *fj += delta * kij;
                }
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Matrix(_) => "full kernel matrix".to_string(),
            Self::Rows { cache, .. } => format!(
                "kernel rows on demand, {} computed, cache of {}",
                cache.computed, cache.capacity
            ),
        }
    }
}

/// Bounded store of kernel rows; the oldest row is evicted first.
struct KernelRowCache {
    capacity: usize,
    rows: HashMap<usize, Vec<f64>>,
    order: VecDeque<usize>,
    computed: usize,
}

impl KernelRowCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rows: HashMap::new(),
            order: VecDeque::new(),
            computed: 0,
        }
    }

    fn get_or_compute(&mut self, i: usize, compute: impl FnOnce() -> Vec<f64>) -> &[f64] {
        if !self.rows.contains_key(&i)
            && self.rows.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.rows.remove(&oldest);
        }

        match self.rows.entry(i) {
            Entry::Occupied(entry) => entry.into_mut().as_slice(),
            Entry::Vacant(entry) => {
                self.order.push_back(i);
                self.computed += 1;
                entry.insert(compute()).as_slice()
            }
        }
    }
}

fn soft_threshold(z: f64, threshold: f64) -> f64 {
    if z > threshold {
        z - threshold
    } else if z < -threshold {
        z + threshold
    } else {
        0.0
    }
}
