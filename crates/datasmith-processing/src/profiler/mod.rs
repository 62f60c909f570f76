//! Dataset profiling: shape, column types, memory footprint, duplicates and
//! per-column distribution shape.

mod distribution;
pub(crate) mod statistics;

pub use distribution::DistributionAnalyzer;

use crate::error::Result;
use crate::types::{ColumnProfile, DatasetSummary, percentage};
use crate::utils::{column_kind, count_duplicates, missing_count};
use polars::prelude::*;
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Data profiler for summarizing dataset structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize the shape, column types, estimated memory footprint and
    /// duplicate rows of a dataset.
    pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
        let column_types = df
            .get_columns()
            .iter()
            .map(|col| Self::profile_column(col.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;

        let duplicates = count_duplicates(df)?;
        let duplicate_percentage = percentage(duplicates, df.height());

        debug!(
            "Summarized dataset: {} rows, {} columns, {} duplicates",
            df.height(),
            df.width(),
            duplicates
        );

        Ok(DatasetSummary {
            rows: df.height(),
            columns: df.width(),
            column_names: df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            column_types,
            memory_usage: df.estimated_size() as f64 / BYTES_PER_MB,
            duplicates,
            duplicate_percentage,
        })
    }

    /// Derive the kind and non-missing count of one column.
    pub fn profile_column(series: &Series) -> Result<ColumnProfile> {
        let missing = missing_count(series)?;
        Ok(ColumnProfile {
            name: series.name().to_string(),
            dtype: format!("{:?}", series.dtype()),
            kind: column_kind(series.dtype()),
            non_missing: series.len() - missing,
        })
    }
}
