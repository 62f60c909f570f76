//! Dataset cleaning: dropping incomplete or duplicate rows and filling gaps.
//!
//! [`DataCleaner::clean`] applies one [`CleaningMethod`] to a snapshot and
//! returns the cleaned table together with a [`CleaningSummary`].

use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::types::{CleaningMethod, CleaningSummary};
use crate::utils::{distinct_rows, is_numeric_dtype, missing_mask};
use polars::prelude::*;
use tracing::{debug, info};

/// Applies cleaning methods to datasets.
pub struct DataCleaner;

impl DataCleaner {
    /// Parse `method` and apply it.
    ///
    /// Unknown names fail with
    /// [`UnsupportedCleaningMethod`](crate::ProcessingError::UnsupportedCleaningMethod).
    pub fn clean_by_name(df: &DataFrame, method: &str) -> Result<(DataFrame, CleaningSummary)> {
        let method: CleaningMethod = method.parse()?;
        Self::clean(df, method)
    }

    /// Apply a cleaning method and summarize its effect.
    pub fn clean(df: &DataFrame, method: CleaningMethod) -> Result<(DataFrame, CleaningSummary)> {
        let original_rows = df.height();
        info!("Cleaning {} rows with '{}'", original_rows, method);

        let (cleaned, summary) = match method {
            CleaningMethod::DropMissing => {
                let cleaned = Self::drop_missing_rows(df)?;
                let removed = original_rows - cleaned.height();
                (cleaned, format!("Dropped {removed} rows with missing values"))
            }
            CleaningMethod::FillMean => (
                Self::map_numeric(df, StatisticalImputer::fill_mean)?,
                "Filled numeric missing values with mean".to_string(),
            ),
            CleaningMethod::FillMedian => (
                Self::map_numeric(df, StatisticalImputer::fill_median)?,
                "Filled numeric missing values with median".to_string(),
            ),
            CleaningMethod::FillMode => (
                Self::fill_mode(df)?,
                "Filled missing values with mode".to_string(),
            ),
            CleaningMethod::ForwardFill => (
                Self::forward_fill(df)?,
                "Applied forward/backward fill for missing values".to_string(),
            ),
            CleaningMethod::DropDuplicates => {
                let cleaned = Self::drop_duplicate_rows(df)?;
                let removed = original_rows - cleaned.height();
                (cleaned, format!("Removed {removed} duplicate rows"))
            }
            CleaningMethod::Interpolate => (
                Self::map_numeric(df, |s| StatisticalImputer::interpolate(s).map(Some))?,
                "Interpolated missing numeric values".to_string(),
            ),
        };

        let cleaned_rows = cleaned.height();
        debug!("{}: {} -> {} rows", method, original_rows, cleaned_rows);

        Ok((
            cleaned,
            CleaningSummary {
                success: true,
                summary,
                original_rows,
                cleaned_rows,
                removed_rows: original_rows - cleaned_rows,
                method,
            },
        ))
    }

    fn drop_missing_rows(df: &DataFrame) -> Result<DataFrame> {
        let mut keep = vec![true; df.height()];
        for col in df.get_columns() {
            let mask = missing_mask(col.as_materialized_series())?;
            for (k, missing) in keep.iter_mut().zip(mask) {
                *k &= !missing;
            }
        }
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        df.filter(&mask).context("Dropping rows with missing values")
    }

    fn drop_duplicate_rows(df: &DataFrame) -> Result<DataFrame> {
        distinct_rows(df).context("Dropping duplicate rows")
    }

    /// Replace each numeric column that has gaps with `f(column)`.
    fn map_numeric<F>(df: &DataFrame, f: F) -> Result<DataFrame>
    where
        F: Fn(&Series) -> Result<Option<Series>>,
    {
        let mut out = df.clone();
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) || !has_missing(series)? {
                continue;
            }
            if let Some(replacement) = f(series)? {
                out.replace(series.name().as_str(), replacement)?;
            } else {
                debug!("Column '{}' has no values, left unchanged", series.name());
            }
        }
        Ok(out)
    }

    fn fill_mode(df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if !has_missing(series)? {
                continue;
            }
            if let Some(replacement) = StatisticalImputer::fill_mode(series)? {
                out.replace(series.name().as_str(), replacement)?;
            }
        }
        Ok(out)
    }

    fn forward_fill(df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let filled = StatisticalImputer::fill_forward_backward(series)?;
            out.replace(series.name().as_str(), filled)?;
        }
        Ok(out)
    }
}

fn has_missing(series: &Series) -> Result<bool> {
    Ok(missing_mask(series)?.into_iter().any(|m| m))
}
