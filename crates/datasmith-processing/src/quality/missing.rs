//! Missing-value statistics.

use crate::error::Result;
use crate::types::{ColumnMissing, MissingReport, percentage};
use crate::utils::missing_count;
use polars::prelude::*;

/// Counts missing cells per column and across the dataset.
pub struct MissingValueAnalyzer;

impl MissingValueAnalyzer {
    /// Build the missing-value report.
    ///
    /// Columns without missing values are left out of the per-column list
    /// but still count toward `total_cells`.
    pub fn analyze(df: &DataFrame) -> Result<MissingReport> {
        let rows = df.height();
        let mut columns = Vec::new();
        let mut total_missing = 0;

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let count = missing_count(series)?;
            total_missing += count;

            if count > 0 {
                columns.push(ColumnMissing {
                    column: series.name().to_string(),
                    missing_count: count,
                    missing_percentage: percentage(count, rows),
                });
            }
        }

        Ok(MissingReport {
            columns,
            total_missing,
            total_cells: rows * df.width(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifteen_percent_missing() {
        let values: Vec<Option<f64>> = (0..100)
            .map(|i| if i < 15 { None } else { Some(i as f64) })
            .collect();
        let df = df! {
            "x" => values,
            "y" => (0..100).map(|i| i as f64).collect::<Vec<_>>(),
        }
        .unwrap();

        let report = MissingValueAnalyzer::analyze(&df).unwrap();
        assert_eq!(report.column_names(), vec!["x"]);
        assert_eq!(report.column("x").unwrap().missing_count, 15);
        assert_eq!(report.column("x").unwrap().missing_percentage, 15.0);
        assert!(report.column("y").is_none());
        assert_eq!(report.total_missing, 15);
        assert_eq!(report.total_cells, 200);
        assert_eq!(report.overall_percentage(), 7.5);
    }

    #[test]
    fn test_total_is_sum_of_columns() {
        let df = df! {
            "a" => &[None, Some(1i64), None],
            "b" => &[Some("x"), None, Some("z")],
            "c" => &[Some(1.0), Some(f64::NAN), None],
        }
        .unwrap();

        let report = MissingValueAnalyzer::analyze(&df).unwrap();
        let sum: usize = report.columns.iter().map(|c| c.missing_count).sum();
        assert_eq!(report.total_missing, sum);
        assert_eq!(report.total_missing, 5);
        assert_eq!(report.column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_zero_rows() {
        let df = df! { "a" => Vec::<f64>::new() }.unwrap();
        let report = MissingValueAnalyzer::analyze(&df).unwrap();
        assert!(report.columns.is_empty());
        assert_eq!(report.total_cells, 0);
        assert_eq!(report.overall_percentage(), 0.0);
    }
}
