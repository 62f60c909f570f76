//! Analysis entrypoint: runs every analyzer over a column selection and
//! assembles the data-quality report.

use crate::config::AnalysisConfig;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::profiler::{DataProfiler, DistributionAnalyzer};
use crate::quality::{MissingValueAnalyzer, OutlierDetector, RecommendationEngine};
use crate::types::{AnalysisMode, AnalysisReport, AnalysisRequest};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Produces [`AnalysisReport`]s for caller-supplied datasets.
///
/// The analyzer holds no per-request state; one instance can serve any
/// number of requests, concurrently.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse the requested columns of `df`.
    ///
    /// # Errors
    ///
    /// - [`ProcessingError::ColumnsNotFound`] if any requested column is absent
    /// - [`ProcessingError::Validation`] if a column is requested twice
    /// - [`ProcessingError::EmptyDataset`] if the selection has no columns
    /// - [`ProcessingError::InvalidConfig`] if the analyzer's thresholds are invalid
    pub fn analyze(&self, df: &DataFrame, request: &AnalysisRequest) -> Result<AnalysisReport> {
        self.config.validate()?;

        let selected = Self::select_columns(df, &request.columns)?;
        if selected.width() == 0 {
            return Err(ProcessingError::EmptyDataset);
        }

        match request.mode {
            AnalysisMode::Full => self.full_report(&selected),
        }
    }

    fn full_report(&self, df: &DataFrame) -> Result<AnalysisReport> {
        info!(
            "Analyzing dataset with {} rows and {} columns",
            df.height(),
            df.width()
        );

        let summary = DataProfiler::summarize(df).context("Summarizing dataset")?;
        let missing_values = MissingValueAnalyzer::analyze(df).context("Counting missing values")?;
        let outliers = OutlierDetector::new(&self.config)
            .detect(df)
            .context("Detecting outliers")?;
        let distributions = DistributionAnalyzer::analyze(df).context("Profiling distributions")?;
        let recommendations =
            RecommendationEngine::new(&self.config).recommend(&summary, &missing_values, &outliers.iqr);

        debug!(
            "Analysis done: {} missing cells, {} IQR outliers, {} recommendations",
            missing_values.total_missing,
            outliers.iqr.total_outliers,
            recommendations.len()
        );

        Ok(AnalysisReport {
            summary,
            missing_values,
            outliers,
            distributions,
            recommendations,
        })
    }

    fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        if columns.is_empty() {
            return Ok(df.clone());
        }

        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ProcessingError::Validation(format!(
                "Column '{dup}' requested more than once"
            )));
        }

        let available: HashSet<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !available.contains(c.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::ColumnsNotFound(missing));
        }

        Ok(df.select(columns.iter().map(|c| c.as_str()))?)
    }
}
