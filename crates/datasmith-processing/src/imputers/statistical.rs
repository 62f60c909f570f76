//! Statistical imputation methods.
//!
//! Every method works on a single column and returns a new series; the input
//! is never modified.

use crate::error::Result;
use crate::types::ColumnKind;
use crate::utils::{
    bool_mode, column_kind, fill_bool_nulls, fill_numeric_nulls, fill_string_nulls,
    numeric_mode, numeric_options, numeric_values, string_mode,
};
use polars::prelude::*;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing numeric values with the column mean.
    ///
    /// Returns `None` when the column has no values to average.
    pub fn fill_mean(series: &Series) -> Result<Option<Series>> {
        match without_nan(series)?.mean() {
            Some(mean) => Ok(Some(fill_numeric_nulls(series, mean)?)),
            None => Ok(None),
        }
    }

    /// Fill missing numeric values with the column median.
    ///
    /// Returns `None` when the column has no values.
    pub fn fill_median(series: &Series) -> Result<Option<Series>> {
        match without_nan(series)?.median() {
            Some(median) => Ok(Some(fill_numeric_nulls(series, median)?)),
            None => Ok(None),
        }
    }

    /// Fill missing values with the most frequent value.
    ///
    /// Ties resolve to the smallest value. Returns `None` for all-missing
    /// columns and for dtypes without a meaningful mode.
    pub fn fill_mode(series: &Series) -> Result<Option<Series>> {
        let filled = match column_kind(series.dtype()) {
            ColumnKind::Numeric => numeric_mode(&numeric_values(series)?)
                .map(|mode| fill_numeric_nulls(series, mode))
                .transpose()?,
            ColumnKind::Text => string_mode(series)
                .map(|mode| fill_string_nulls(series, &mode))
                .transpose()?,
            ColumnKind::Boolean => bool_mode(series)?
                .map(|mode| fill_bool_nulls(series, mode))
                .transpose()?,
            ColumnKind::Other => None,
        };
        Ok(filled)
    }

    /// Propagate the last valid value forward, then fill any leading gap
    /// with the first valid value.
    pub fn fill_forward_backward(series: &Series) -> Result<Series> {
        let base = if matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
            without_nan(series)?
        } else {
            series.clone()
        };

        let filled = base.fill_null(FillNullStrategy::Forward(None))?;
        Ok(filled.fill_null(FillNullStrategy::Backward(None))?)
    }

    /// Linearly interpolate interior gaps of a numeric column by position.
    ///
    /// Trailing gaps take the last valid value; leading gaps stay missing.
    pub fn interpolate(series: &Series) -> Result<Series> {
        let values = numeric_options(series)?;
        Ok(Series::new(series.name().clone(), interpolate_linear(&values)))
    }
}

/// A numeric column as `Float64` with NaN turned into null.
fn without_nan(series: &Series) -> Result<Series> {
    Ok(Series::new(series.name().clone(), numeric_options(series)?))
}

fn interpolate_linear(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut last_valid: Option<(usize, f64)> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(v) = *value else { continue };
        if let Some((j, prev)) = last_valid
            && i > j + 1
        {
            let span = (i - j) as f64;
            for (k, slot) in out.iter_mut().enumerate().take(i).skip(j + 1) {
                *slot = Some(prev + (v - prev) * (k - j) as f64 / span);
            }
        }
        last_valid = Some((i, v));
    }

    if let Some((j, prev)) = last_valid {
        for slot in out.iter_mut().skip(j + 1) {
            *slot = Some(prev);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_values(series: &Series) -> Vec<Option<f64>> {
        series.f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_fill_mean() {
        let s = Series::new("x".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = StatisticalImputer::fill_mean(&s).unwrap().unwrap();
        assert_eq!(f64_values(&filled), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_fill_median_of_integers() {
        let s = Series::new("x".into(), &[Some(1i64), Some(10), None, Some(2)]);
        let filled = StatisticalImputer::fill_median(&s).unwrap().unwrap();
        assert_eq!(
            f64_values(&filled),
            vec![Some(1.0), Some(10.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn test_fill_mean_and_median_ignore_nan() {
        let s = Series::new("x".into(), &[Some(2.0), Some(f64::NAN), None, Some(4.0), Some(9.0)]);

        let mean = StatisticalImputer::fill_mean(&s).unwrap().unwrap();
        assert_eq!(f64_values(&mean)[1], Some(5.0));
        assert_eq!(f64_values(&mean)[2], Some(5.0));

        let median = StatisticalImputer::fill_median(&s).unwrap().unwrap();
        assert_eq!(
            f64_values(&median),
            vec![Some(2.0), Some(4.0), Some(4.0), Some(4.0), Some(9.0)]
        );
    }

    #[test]
    fn test_fill_mean_all_missing_is_skipped() {
        let s = Series::new("x".into(), &[None::<f64>, None]);
        assert!(StatisticalImputer::fill_mean(&s).unwrap().is_none());
    }

    #[test]
    fn test_fill_mode_text_and_bool() {
        let s = Series::new("c".into(), &[Some("b"), None, Some("a"), Some("b")]);
        let filled = StatisticalImputer::fill_mode(&s).unwrap().unwrap();
        let values: Vec<Option<&str>> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("b"), Some("b"), Some("a"), Some("b")]);

        let s = Series::new("f".into(), &[Some(true), None, Some(false)]);
        let filled = StatisticalImputer::fill_mode(&s).unwrap().unwrap();
        let values: Vec<Option<bool>> = filled.bool().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(true), Some(false), Some(false)]);
    }

    #[test]
    fn test_forward_backward_fill() {
        let s = Series::new("x".into(), &[None, Some(1.0), None, Some(f64::NAN), Some(4.0)]);
        let filled = StatisticalImputer::fill_forward_backward(&s).unwrap();
        assert_eq!(
            f64_values(&filled),
            vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(4.0)]
        );
    }

    #[test]
    fn test_interpolate_interior_leading_and_trailing() {
        let values = [None, Some(0.0), None, None, Some(3.0), None];
        assert_eq!(
            interpolate_linear(&values),
            vec![None, Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_interpolate_series() {
        let s = Series::new("x".into(), &[Some(10i64), None, Some(20)]);
        let filled = StatisticalImputer::interpolate(&s).unwrap();
        assert_eq!(f64_values(&filled), vec![Some(10.0), Some(15.0), Some(20.0)]);
    }
}
