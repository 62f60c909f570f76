//! Tabular data-quality analysis and cleaning built on Polars.
//!
//! # Overview
//!
//! - **Summary**: shape, column types, memory footprint, duplicate rows
//! - **Missing values**: per-column counts and percentages plus dataset totals
//! - **Outliers**: IQR fences and z-score cutoffs over numeric columns
//! - **Distributions**: mean, median, spread, skewness and kurtosis
//! - **Recommendations**: ordered, human-readable advice derived from the above
//! - **Cleaning**: drop/fill/interpolate/deduplicate with a cleaning summary
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datasmith_processing::{AnalysisConfig, AnalysisRequest, Analyzer, read_dataset};
//!
//! let df = read_dataset("data.csv")?;
//!
//! let report = Analyzer::new(AnalysisConfig::default())
//!     .analyze(&df, &AnalysisRequest::all_columns())?;
//!
//! for rec in &report.recommendations {
//!     println!("- {rec}");
//! }
//! ```
//!
//! # Cleaning
//!
//! ```rust,ignore
//! use datasmith_processing::{CleaningMethod, DataCleaner};
//!
//! let (cleaned, summary) = DataCleaner::clean(&df, CleaningMethod::FillMedian)?;
//! println!("{} ({} -> {} rows)", summary.summary, summary.original_rows, summary.cleaned_rows);
//! ```
//!
//! # Configuration
//!
//! Thresholds are defaults, not constants:
//!
//! ```rust,ignore
//! let config = AnalysisConfig::builder()
//!     .iqr_multiplier(3.0)
//!     .zscore_threshold(2.5)
//!     .duplicate_threshold(1.0)
//!     .build()?;
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod profiler;
pub mod quality;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::Analyzer;
pub use cleaner::DataCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::{
    DatasetFormat, read_dataset, records_from_json, records_to_dataframe, write_csv,
};
pub use error::{ErrorKind, ProcessingError, Result as ProcessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use profiler::{DataProfiler, DistributionAnalyzer};
pub use quality::{MissingValueAnalyzer, OutlierDetector, RecommendationEngine};
pub use types::{
    AnalysisMode, AnalysisReport, AnalysisRequest, CleaningMethod, CleaningSummary, ColumnKind,
    ColumnMissing, ColumnOutliers, ColumnProfile, DatasetSummary, DistributionProfile,
    MissingReport, OutlierBounds, OutlierMethod, OutlierReport, OutlierSummary, SkewCategory,
};
pub use utils::{DtypeCategory, column_kind, get_dtype_category, is_numeric_dtype};
