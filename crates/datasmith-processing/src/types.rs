//! Report and request types produced by the analysis and cleaning entrypoints.
//!
//! Every report is a plain, serializable value built fresh per request. Column
//! order inside a report always follows the dataset's declared column order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;

// =============================================================================
// Column profiles and dataset summary
// =============================================================================

/// Inferred kind of a column, derived from its dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    /// Temporal, nested and other dtypes; treated as non-numeric.
    Other,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        self == ColumnKind::Numeric
    }
}

/// Derived facts about a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Polars dtype name, e.g. `Int64`, `Float64`, `String`.
    pub dtype: String,
    pub kind: ColumnKind,
    pub non_missing: usize,
}

/// Shape, types, memory footprint and duplicate statistics of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_types: Vec<ColumnProfile>,
    /// Estimated in-memory size in megabytes.
    pub memory_usage: f64,
    /// Rows identical to an earlier row across all columns.
    pub duplicates: usize,
    pub duplicate_percentage: f64,
}

impl DatasetSummary {
    /// Number of columns whose kind is numeric.
    pub fn numeric_column_count(&self) -> usize {
        self.column_types.iter().filter(|c| c.kind.is_numeric()).count()
    }
}

// =============================================================================
// Missing values
// =============================================================================

/// Missing-value statistics for one column with at least one missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
}

/// Per-column and dataset-wide missing-value statistics.
///
/// Only columns with at least one missing value appear in `columns`; every
/// column contributes to `total_missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub columns: Vec<ColumnMissing>,
    pub total_missing: usize,
    pub total_cells: usize,
}

impl MissingReport {
    /// Look up the entry for a column, if it has missing values.
    pub fn column(&self, name: &str) -> Option<&ColumnMissing> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Names of the columns that have missing values, in dataset order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }

    /// Missing cells as a percentage of all cells (0 when the dataset is empty).
    pub fn overall_percentage(&self) -> f64 {
        percentage(self.total_missing, self.total_cells)
    }
}

// =============================================================================
// Outliers
// =============================================================================

/// Outlier detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    Iqr,
    Zscore,
}

/// Parameters a detector used for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutlierBounds {
    Iqr {
        q1: f64,
        q3: f64,
        iqr: f64,
        lower_bound: f64,
        upper_bound: f64,
    },
    Zscore {
        threshold: f64,
        mean: f64,
        std: f64,
    },
}

/// Outliers found in one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub count: usize,
    /// Relative to the column's non-missing count.
    pub percentage: f64,
    pub bounds: OutlierBounds,
}

/// Result of one detection method over all numeric columns.
///
/// `total_outliers` sums per-column counts; a row flagged in several columns
/// is counted once per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub method: OutlierMethod,
    pub columns: Vec<ColumnOutliers>,
    pub total_outliers: usize,
}

impl OutlierReport {
    pub(crate) fn new(method: OutlierMethod, columns: Vec<ColumnOutliers>) -> Self {
        let total_outliers = columns.iter().map(|c| c.count).sum();
        Self {
            method,
            columns,
            total_outliers,
        }
    }

    /// Look up the entry for a column, if it has outliers.
    pub fn column(&self, name: &str) -> Option<&ColumnOutliers> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Both outlier reports side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub iqr: OutlierReport,
    pub zscore: OutlierReport,
}

// =============================================================================
// Distributions
// =============================================================================

/// Coarse skewness bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkewCategory {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Moderately Skewed")]
    ModeratelySkewed,
    #[serde(rename = "Highly Skewed")]
    HighlySkewed,
}

impl SkewCategory {
    /// Classify a skewness value: |s| < 0.5 normal, |s| < 1 moderate, else high.
    pub fn from_skewness(skewness: f64) -> Self {
        let magnitude = skewness.abs();
        if magnitude < 0.5 {
            SkewCategory::Normal
        } else if magnitude < 1.0 {
            SkewCategory::ModeratelySkewed
        } else {
            SkewCategory::HighlySkewed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkewCategory::Normal => "Normal",
            SkewCategory::ModeratelySkewed => "Moderately Skewed",
            SkewCategory::HighlySkewed => "Highly Skewed",
        }
    }
}

impl fmt::Display for SkewCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution shape of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionProfile {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    /// Excess kurtosis (normal distribution = 0).
    pub kurtosis: f64,
    pub skew_category: SkewCategory,
}

// =============================================================================
// Analysis request / report
// =============================================================================

/// Which analyses to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Full,
}

impl FromStr for AnalysisMode {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(AnalysisMode::Full),
            other => Err(ProcessingError::Validation(format!(
                "Unknown analysis mode: {other}"
            ))),
        }
    }
}

/// Request for the analysis entrypoint.
///
/// An empty `columns` list selects every column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub columns: Vec<String>,
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    /// Analyse every column.
    pub fn all_columns() -> Self {
        Self::default()
    }

    /// Restrict the analysis to the given columns, in the given order.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            mode: AnalysisMode::Full,
        }
    }
}

/// Complete data-quality report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: DatasetSummary,
    pub missing_values: MissingReport,
    pub outliers: OutlierSummary,
    pub distributions: Vec<DistributionProfile>,
    /// Never empty.
    pub recommendations: Vec<String>,
}

// =============================================================================
// Cleaning
// =============================================================================

/// Supported cleaning operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningMethod {
    DropMissing,
    FillMean,
    FillMedian,
    FillMode,
    ForwardFill,
    DropDuplicates,
    Interpolate,
}

impl CleaningMethod {
    pub const ALL: [CleaningMethod; 7] = [
        CleaningMethod::DropMissing,
        CleaningMethod::FillMean,
        CleaningMethod::FillMedian,
        CleaningMethod::FillMode,
        CleaningMethod::ForwardFill,
        CleaningMethod::DropDuplicates,
        CleaningMethod::Interpolate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningMethod::DropMissing => "drop_missing",
            CleaningMethod::FillMean => "fill_mean",
            CleaningMethod::FillMedian => "fill_median",
            CleaningMethod::FillMode => "fill_mode",
            CleaningMethod::ForwardFill => "forward_fill",
            CleaningMethod::DropDuplicates => "drop_duplicates",
            CleaningMethod::Interpolate => "interpolate",
        }
    }
}

impl fmt::Display for CleaningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningMethod {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CleaningMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ProcessingError::UnsupportedCleaningMethod(s.to_string()))
    }
}

/// Outcome of a cleaning operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub success: bool,
    pub summary: String,
    pub original_rows: usize,
    pub cleaned_rows: usize,
    pub removed_rows: usize,
    pub method: CleaningMethod,
}

/// `part / whole * 100`, or 0 when `whole` is zero.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

static_assertions::assert_impl_all!(AnalysisReport: Send, Sync);
static_assertions::assert_impl_all!(CleaningSummary: Send, Sync);
static_assertions::assert_impl_all!(AnalysisRequest: Send, Sync);
