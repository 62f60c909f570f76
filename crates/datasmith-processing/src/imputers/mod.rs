//! Imputation strategies for filling missing values.
//!
//! - [`StatisticalImputer`]: Mean, median, mode, fill-forward and linear interpolation

mod statistical;

pub use statistical::StatisticalImputer;
