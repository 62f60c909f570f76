//! IQR and z-score outlier detection over numeric columns.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::profiler::statistics::{mean, quantile, sample_std, sorted};
use crate::types::{
    ColumnOutliers, OutlierBounds, OutlierMethod, OutlierReport, OutlierSummary, percentage,
};
use crate::utils::{is_numeric_dtype, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Flags numeric values that fall outside IQR fences or a z-score cutoff.
pub struct OutlierDetector<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> OutlierDetector<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run both detection methods.
    pub fn detect(&self, df: &DataFrame) -> Result<OutlierSummary> {
        Ok(OutlierSummary {
            iqr: self.detect_iqr(df)?,
            zscore: self.detect_zscore(df)?,
        })
    }

    /// Values strictly outside `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub fn detect_iqr(&self, df: &DataFrame) -> Result<OutlierReport> {
        let mut columns = Vec::new();

        for (name, values) in numeric_columns(df)? {
            if values.len() < self.config.min_iqr_values {
                debug!(
                    "Skipping IQR for '{}': {} values (need {})",
                    name,
                    values.len(),
                    self.config.min_iqr_values
                );
                continue;
            }

            let ordered = sorted(&values);
            let q1 = quantile(&ordered, 0.25);
            let q3 = quantile(&ordered, 0.75);
            let iqr = q3 - q1;
            let lower_bound = q1 - self.config.iqr_multiplier * iqr;
            let upper_bound = q3 + self.config.iqr_multiplier * iqr;

            let count = values
                .iter()
                .filter(|&&v| v < lower_bound || v > upper_bound)
                .count();

            if count > 0 {
                columns.push(ColumnOutliers {
                    column: name,
                    count,
                    percentage: percentage(count, values.len()),
                    bounds: OutlierBounds::Iqr {
                        q1,
                        q3,
                        iqr,
                        lower_bound,
                        upper_bound,
                    },
                });
            }
        }

        Ok(OutlierReport::new(OutlierMethod::Iqr, columns))
    }

    /// Values whose absolute z-score exceeds the configured threshold.
    pub fn detect_zscore(&self, df: &DataFrame) -> Result<OutlierReport> {
        let threshold = self.config.zscore_threshold;
        let mut columns = Vec::new();

        for (name, values) in numeric_columns(df)? {
            let std = sample_std(&values);
            if std == 0.0 {
                continue;
            }
            let m = mean(&values);

            let count = values
                .iter()
                .filter(|&&v| ((v - m) / std).abs() > threshold)
                .count();

            if count > 0 {
                columns.push(ColumnOutliers {
                    column: name,
                    count,
                    percentage: percentage(count, values.len()),
                    bounds: OutlierBounds::Zscore {
                        threshold,
                        mean: m,
                        std,
                    },
                });
            }
        }

        Ok(OutlierReport::new(OutlierMethod::Zscore, columns))
    }
}

fn numeric_columns(df: &DataFrame) -> Result<Vec<(String, Vec<f64>)>> {
    df.get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .filter(|s| is_numeric_dtype(s.dtype()))
        .map(|s| Ok((s.name().to_string(), numeric_values(s)?)))
        .collect()
}
