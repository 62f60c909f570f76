//! Distribution shape of numeric columns.

use super::statistics::{kurtosis, mean, median, sample_std, skewness};
use crate::error::Result;
use crate::types::{DistributionProfile, SkewCategory};
use crate::utils::{is_numeric_dtype, numeric_values};
use polars::prelude::*;

/// Computes central tendency, spread and shape for each numeric column.
pub struct DistributionAnalyzer;

impl DistributionAnalyzer {
    /// Profile every numeric column that has at least one non-missing value.
    pub fn analyze(df: &DataFrame) -> Result<Vec<DistributionProfile>> {
        let mut profiles = Vec::new();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }
            if let Some(profile) = Self::profile_series(series)? {
                profiles.push(profile);
            }
        }

        Ok(profiles)
    }

    /// Profile a single numeric series; `None` when it has no values.
    pub fn profile_series(series: &Series) -> Result<Option<DistributionProfile>> {
        let values = numeric_values(series)?;
        if values.is_empty() {
            return Ok(None);
        }

        let skew = skewness(&values);
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(Some(DistributionProfile {
            column: series.name().to_string(),
            count: values.len(),
            mean: mean(&values),
            median: median(&values),
            std: sample_std(&values),
            min,
            max,
            skewness: skew,
            kurtosis: kurtosis(&values),
            skew_category: SkewCategory::from_skewness(skew),
        }))
    }
}
