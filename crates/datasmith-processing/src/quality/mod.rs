//! Data quality assessment: missing values, outliers and recommendations.

mod missing;
mod outliers;
mod recommendations;

pub use missing::MissingValueAnalyzer;
pub use outliers::OutlierDetector;
pub use recommendations::RecommendationEngine;
