//! Regression training over Polars DataFrames.
//!
//! `datasmith-learning` turns a dataset and a [`TrainingRequest`] into a
//! [`TrainingReport`]: it encodes and cleans the selected columns, performs a
//! seeded train/test split, standardizes features on the training partition,
//! fits one of three native models and evaluates it.
//!
//! # Models
//!
//! | Kind                | Model                                   | Importance |
//! |---------------------|-----------------------------------------|------------|
//! | `linear_regression` | OLS with intercept                      | no         |
//! | `random_forest`     | 100 bootstrap CART trees (rayon)        | yes        |
//! | `svm`               | epsilon-SVR, RBF kernel, C=100, eps=0.1 | no         |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datasmith_learning::{ModelTrainer, TrainingConfig, TrainingRequest};
//!
//! let trainer = ModelTrainer::new(TrainingConfig::default());
//! let request = TrainingRequest::new(["area", "rooms", "city"], "price", "random_forest");
//!
//! let report = trainer.train(&df, &request)?;
//! println!("R2 on test data: {:.3}", report.metrics.test.r2);
//! if let Some(ranking) = &report.feature_importance {
//!     for (feature, importance) in ranking {
//!         println!("{feature}: {importance:.3}");
//!     }
//! }
//! ```
//!
//! # Reproducibility
//!
//! The split and every tree's bootstrap are driven by `ChaCha8Rng` seeded
//! from [`TrainingConfig::random_seed`]. Training the same request twice on
//! the same data yields identical reports apart from the timing field.

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preparation;
pub mod scaler;
pub mod types;

// Re-exports for convenient access
pub use config::{TrainingConfig, TrainingConfigBuilder};
pub use error::{LearningError, Result};
pub use model::Model;
pub use pipeline::ModelTrainer;
pub use preparation::{FeaturePreparer, LabelEncoding, PreparedDataset};
pub use scaler::StandardScaler;
pub use types::{
    ModelKind, PartitionMetrics, PredictionSample, RegressionMetrics, TrainingReport,
    TrainingRequest,
};
