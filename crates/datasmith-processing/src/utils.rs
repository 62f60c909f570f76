//! Shared helpers for dtype classification, missing-value handling and row
//! identity.

use polars::prelude::*;
use std::collections::HashMap;

use crate::types::ColumnKind;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for analysis purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[inline]
fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Map a dtype onto the coarse column kind used in reports.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    match get_dtype_category(dtype) {
        DtypeCategory::Numeric => ColumnKind::Numeric,
        DtypeCategory::Boolean => ColumnKind::Boolean,
        DtypeCategory::String => ColumnKind::Text,
        DtypeCategory::Datetime | DtypeCategory::Other => ColumnKind::Other,
    }
}

// =============================================================================
// Missing Value Utilities
// =============================================================================

/// Per-row missing flags. Nulls are missing; so is NaN in float columns.
pub fn missing_mask(series: &Series) -> PolarsResult<Vec<bool>> {
    if is_float_dtype(series.dtype()) {
        let cast = series.cast(&DataType::Float64)?;
        Ok(cast
            .f64()?
            .into_iter()
            .map(|v| v.is_none_or(f64::is_nan))
            .collect())
    } else {
        Ok(series
            .is_null()
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect())
    }
}

/// Number of missing values (nulls, plus NaN for float columns).
pub fn missing_count(series: &Series) -> PolarsResult<usize> {
    if is_float_dtype(series.dtype()) {
        Ok(missing_mask(series)?.into_iter().filter(|m| *m).count())
    } else {
        Ok(series.null_count())
    }
}

/// Values of a numeric column as `f64`, with nulls and NaN mapped to `None`.
pub fn numeric_options(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Non-missing values of a numeric column, in row order.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_options(series)?.into_iter().flatten().collect())
}

/// Replace missing entries of a numeric column with `fill_value`.
///
/// The result is always a `Float64` series with the same name.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<Option<f64>> = numeric_options(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let cast = series.cast(&DataType::String)?;
    let filled: Vec<Option<String>> = cast
        .str()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a boolean Series with a specific value.
pub fn fill_bool_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let filled: Vec<Option<bool>> = series
        .bool()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Mode Utilities
// =============================================================================

/// Most frequent text value; ties resolve to the lexicographically smallest.
pub fn string_mode(series: &Series) -> Option<String> {
    let cast = series.cast(&DataType::String).ok()?;
    let chunked = cast.str().ok()?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for val in chunked.into_iter().flatten() {
        *counts.entry(val).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .min_by(|(a_val, a_count), (b_val, b_count)| {
            b_count.cmp(a_count).then_with(|| a_val.cmp(b_val))
        })
        .map(|(val, _)| val.to_string())
}

/// Bit pattern of a float with `-0.0` folded into `0.0`.
#[inline]
fn float_key(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

/// Most frequent number; ties resolve to the smallest value.
pub fn numeric_mode(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &v in values {
        counts.entry(float_key(v)).or_insert((v, 0)).1 += 1;
    }

    counts
        .into_values()
        .min_by(|(a_val, a_count), (b_val, b_count)| {
            b_count.cmp(a_count).then_with(|| a_val.total_cmp(b_val))
        })
        .map(|(val, _)| val)
}

/// Most frequent boolean; a tie resolves to `false`.
pub fn bool_mode(series: &Series) -> PolarsResult<Option<bool>> {
    let (mut trues, mut falses) = (0usize, 0usize);
    for v in series.bool()?.into_iter().flatten() {
        if v {
            trues += 1;
        } else {
            falses += 1;
        }
    }

    Ok(match (trues, falses) {
        (0, 0) => None,
        (t, f) => Some(t > f),
    })
}

// =============================================================================
// Row Identity
// =============================================================================

/// Copy of `df` whose float columns have NaN turned into null and `-0.0`
/// folded into `0.0`.
fn comparable_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut out = df.clone();
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if !is_float_dtype(series.dtype()) {
            continue;
        }
        let normalized: Vec<Option<f64>> = numeric_options(series)?
            .into_iter()
            .map(|v| v.map(|x| if x == 0.0 { 0.0 } else { x }))
            .collect();
        let normalized =
            Series::new(series.name().clone(), normalized).cast(series.dtype())?;
        out.replace(series.name().as_str(), normalized)?;
    }
    Ok(out)
}

/// Row positions of the first occurrence of every distinct row, in order.
///
/// Missing values compare equal to each other.
fn distinct_row_positions(df: &DataFrame) -> PolarsResult<IdxCa> {
    let mut index_name = String::from("__row_position");
    while df.get_column_index(&index_name).is_some() {
        index_name.push('_');
    }

    let subset: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
    let distinct = comparable_rows(df)?
        .with_row_index(index_name.as_str().into(), None)?
        .unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?;

    Ok(distinct
        .column(&index_name)?
        .as_materialized_series()
        .idx()?
        .clone())
}

/// `df` without rows that repeat an earlier row, first occurrences kept in
/// their original order.
pub fn distinct_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(df.clone());
    }
    df.take(&distinct_row_positions(df)?)
}

/// Number of rows that duplicate an earlier row.
pub fn count_duplicates(df: &DataFrame) -> PolarsResult<usize> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(0);
    }
    Ok(df.height() - distinct_row_positions(df)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind(&DataType::Int32), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Float64), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Text);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Boolean);
        assert_eq!(column_kind(&DataType::Date), ColumnKind::Other);
    }

    #[test]
    fn test_missing_mask_counts_nan_in_float_columns() {
        let s = Series::new("x".into(), &[Some(1.0), None, Some(f64::NAN), Some(4.0)]);
        assert_eq!(missing_mask(&s).unwrap(), vec![false, true, true, false]);
        assert_eq!(missing_count(&s).unwrap(), 2);
    }

    #[test]
    fn test_numeric_values_skip_missing() {
        let s = Series::new("x".into(), &[Some(3i64), None, Some(1)]);
        assert_eq!(numeric_values(&s).unwrap(), vec![3.0, 1.0]);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let s = Series::new("x".into(), &[Some(1i64), None, Some(3)]);
        let filled = fill_numeric_nulls(&s, 2.0).unwrap();
        assert_eq!(filled.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = filled.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_string_mode_prefers_smallest_on_tie() {
        let s = Series::new("c".into(), &[Some("b"), Some("a"), None, Some("b"), Some("a")]);
        assert_eq!(string_mode(&s), Some("a".to_string()));

        let s = Series::new("c".into(), &[Some("z"), Some("y"), Some("z")]);
        assert_eq!(string_mode(&s), Some("z".to_string()));
    }

    #[test]
    fn test_numeric_mode() {
        assert_eq!(numeric_mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(numeric_mode(&[5.0, 5.0, 1.0]), Some(5.0));
        assert_eq!(numeric_mode(&[]), None);
    }

    #[test]
    fn test_distinct_rows_treat_nulls_as_equal() {
        let df = df! {
            "a" => &[Some(1i64), Some(1), None, None, Some(2)],
            "b" => &[Some("x"), Some("x"), None, None, Some("x")],
        }
        .unwrap();

        let distinct = distinct_rows(&df).unwrap();
        let a: Vec<Option<i64>> = distinct.column("a").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(a, vec![Some(1), None, Some(2)]);
        assert_eq!(count_duplicates(&df).unwrap(), 2);
    }

    #[test]
    fn test_distinct_rows_keep_first_occurrence_in_order() {
        let df = df! {
            "id" => &[3i64, 1, 3, 2, 1],
            "tag" => &["c", "a", "c", "b", "a"],
        }
        .unwrap();

        let distinct = distinct_rows(&df).unwrap();
        let ids: Vec<Option<i64>> = distinct.column("id").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_nan_and_null_are_the_same_missing_value() {
        let df = df! {
            "x" => &[Some(f64::NAN), None, Some(1.0), Some(f64::NAN)],
            "k" => &["a", "a", "b", "a"],
        }
        .unwrap();

        assert_eq!(count_duplicates(&df).unwrap(), 2);
        let distinct = distinct_rows(&df).unwrap();
        assert_eq!(distinct.height(), 2);
        let x: Vec<Option<f64>> = distinct.column("x").unwrap().f64().unwrap().into_iter().collect();
        assert!(x[0].is_some_and(f64::is_nan));
        assert_eq!(x[1], Some(1.0));
    }

    #[test]
    fn test_duplicates_fold_negative_zero() {
        let df = df! { "a" => &[0.0f64, -0.0] }.unwrap();
        assert_eq!(count_duplicates(&df).unwrap(), 1);
    }

    #[test]
    fn test_distinct_rows_with_clashing_column_name() {
        let df = df! { "__row_position" => &[1i64, 1, 2] }.unwrap();
        assert_eq!(count_duplicates(&df).unwrap(), 1);
        assert_eq!(distinct_rows(&df).unwrap().width(), 1);
    }
}
