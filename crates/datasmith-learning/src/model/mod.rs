//! Regression models behind a closed enum.
//!
//! [`Model::for_kind`] builds an unfitted model from a [`ModelKind`] and the
//! training configuration; every variant then exposes the same
//! fit / predict / importance surface.

mod forest;
mod linear;
mod svm;
mod tree;

pub use forest::RandomForestRegressor;
pub use linear::LinearRegression;
pub use svm::{MAX_CACHED_KERNEL_SAMPLES, SupportVectorRegressor, SvrParams};
pub use tree::DecisionTreeRegressor;

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::types::ModelKind;
use ndarray::{Array1, ArrayView1, ArrayView2};

#[derive(Debug, Clone)]
pub enum Model {
    Linear(LinearRegression),
    RandomForest(RandomForestRegressor),
    Svm(SupportVectorRegressor),
}

impl Model {
    /// Unfitted model of the given kind.
    pub fn for_kind(kind: ModelKind, config: &TrainingConfig) -> Self {
        match kind {
            ModelKind::LinearRegression => Self::Linear(LinearRegression::new()),
            ModelKind::RandomForest => Self::RandomForest(RandomForestRegressor::new(
                config.n_estimators,
                config.random_seed,
            )),
            ModelKind::Svm => Self::Svm(SupportVectorRegressor::new(SvrParams {
                c: config.svm_c,
                epsilon: config.svm_epsilon,
                max_iter: config.svm_max_iter,
                tol: config.svm_tol,
            })),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Linear(_) => ModelKind::LinearRegression,
            Self::RandomForest(_) => ModelKind::RandomForest,
            Self::Svm(_) => ModelKind::Svm,
        }
    }

    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        match self {
            Self::Linear(m) => m.fit(x, y),
            Self::RandomForest(m) => m.fit(x, y),
            Self::Svm(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        match self {
            Self::Linear(m) => m.predict(x),
            Self::RandomForest(m) => m.predict(x),
            Self::Svm(m) => m.predict(x),
        }
    }

    /// Normalized importances, one per feature, for models that expose them.
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        match self {
            Self::RandomForest(m) => m.feature_importances(),
            Self::Linear(_) | Self::Svm(_) => None,
        }
    }

    /// Non-fatal issues raised by the last fit.
    pub fn fit_warnings(&self) -> Vec<String> {
        match self {
            Self::Svm(m) if !m.converged() => vec![format!(
                "SVM solver did not converge within {} iterations",
                m.iterations()
            )],
            _ => Vec::new(),
        }
    }
}
