//! Turning a mixed-type dataset into a numeric design matrix.
//!
//! [`FeaturePreparer`] selects the requested feature and target columns,
//! drops incomplete rows, label-encodes text columns and maps booleans to 0/1.

use crate::error::{LearningError, Result};
use datasmith_processing::types::ColumnKind;
use datasmith_processing::utils::{column_kind, missing_mask, numeric_options};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Codes assigned to the distinct values of a text column.
///
/// The class at index `i` is encoded as `i`. Classes are sorted, so the
/// encoding does not depend on row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    pub column: String,
    pub classes: Vec<String>,
}

impl LabelEncoding {
    fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self {
            column: column.to_string(),
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Code of `value`, if it was seen while fitting.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }
}

/// Numeric training data ready for splitting and scaling.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// `retained_rows x feature_names.len()` matrix.
    pub features: Array2<f64>,
    pub target: Array1<f64>,
    pub feature_names: Vec<String>,
    /// Height of the input dataset.
    pub original_rows: usize,
    /// Rows that survived both missing-value drops.
    pub retained_rows: usize,
    /// Encodings for every label-encoded column, target included.
    pub encodings: Vec<LabelEncoding>,
}

impl PreparedDataset {
    pub fn dropped_rows(&self) -> usize {
        self.original_rows - self.retained_rows
    }
}

/// Coerces selected columns to `f64`.
pub struct FeaturePreparer;

impl FeaturePreparer {
    /// Build the design matrix for `features` and the target vector.
    ///
    /// # Errors
    ///
    /// - [`LearningError::TargetInFeatures`] if `target` is listed as a feature
    /// - [`LearningError::ColumnsNotFound`] naming every absent column
    pub fn prepare(df: &DataFrame, features: &[String], target: &str) -> Result<PreparedDataset> {
        if features.iter().any(|f| f == target) {
            return Err(LearningError::TargetInFeatures(target.to_string()));
        }

        let missing: Vec<String> = features
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(target))
            .filter(|name| df.column(name).is_err())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(LearningError::ColumnsNotFound(missing));
        }

        let names: Vec<&str> = features
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(target))
            .collect();
        let series: Vec<&Series> = names
            .iter()
            .map(|name| df.column(name).map(Column::as_materialized_series))
            .collect::<PolarsResult<_>>()?;

        let original_rows = df.height();
        let mut keep = vec![true; original_rows];
        for s in &series {
            for (row, is_missing) in missing_mask(s)?.into_iter().enumerate() {
                if is_missing {
                    keep[row] = false;
                }
            }
        }
        let kept_rows: Vec<usize> = (0..original_rows).filter(|&r| keep[r]).collect();

        let mut encodings = Vec::new();
        let mut coerced: Vec<Vec<Option<f64>>> = Vec::with_capacity(series.len());
        for s in &series {
            let (values, encoding) = coerce_column(s, &kept_rows)?;
            encodings.extend(encoding);
            coerced.push(values);
        }

        // Coercion can still yield gaps, so drop once more.
        let complete: Vec<usize> = (0..kept_rows.len())
            .filter(|&i| coerced.iter().all(|col| col[i].is_some()))
            .collect();

        let n_features = features.len();
        let retained_rows = complete.len();
        let matrix = Array2::from_shape_fn((retained_rows, n_features), |(i, j)| {
            coerced[j][complete[i]].unwrap_or(f64::NAN)
        });
        let target_values = Array1::from_iter(
            complete
                .iter()
                .map(|&i| coerced[n_features][i].unwrap_or(f64::NAN)),
        );

        debug!(
            "Prepared {} of {} rows with {} features ({} encoded columns)",
            retained_rows,
            original_rows,
            n_features,
            encodings.len()
        );

        Ok(PreparedDataset {
            features: matrix,
            target: target_values,
            feature_names: features.to_vec(),
            original_rows,
            retained_rows,
            encodings,
        })
    }
}

/// Numeric values of `series` at `rows`, plus the label encoding if one was
/// needed.
fn coerce_column(
    series: &Series,
    rows: &[usize],
) -> Result<(Vec<Option<f64>>, Option<LabelEncoding>)> {
    match column_kind(series.dtype()) {
        ColumnKind::Numeric => {
            let values = numeric_options(series)?;
            Ok((rows.iter().map(|&r| values[r]).collect(), None))
        }
        ColumnKind::Boolean => {
            let values: Vec<Option<bool>> = series.bool()?.into_iter().collect();
            Ok((
                rows.iter()
                    .map(|&r| values[r].map(|b| if b { 1.0 } else { 0.0 }))
                    .collect(),
                None,
            ))
        }
        ColumnKind::Text | ColumnKind::Other => {
            let cast = series.cast(&DataType::String)?;
            let text: Vec<Option<&str>> = cast.str()?.into_iter().collect();
            let selected: Vec<Option<&str>> = rows.iter().map(|&r| text[r]).collect();

            let encoding = LabelEncoding::fit(series.name().as_str(), selected.iter().flatten().copied());
            let codes = selected
                .iter()
                .map(|v| v.and_then(|s| encoding.encode(s)).map(|c| c as f64))
                .collect();
            Ok((codes, Some(encoding)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_numeric_columns_pass_through() {
        let df = df![
            "a" => [1i64, 2, 3],
            "b" => [0.5, 1.5, 2.5],
            "y" => [10.0, 20.0, 30.0],
        ]
        .unwrap();

        let prepared = FeaturePreparer::prepare(&df, &names(&["a", "b"]), "y").unwrap();
        assert_eq!(prepared.features.shape(), &[3, 2]);
        assert_eq!(prepared.features[[1, 0]], 2.0);
        assert_eq!(prepared.features[[2, 1]], 2.5);
        assert_eq!(prepared.target.to_vec(), vec![10.0, 20.0, 30.0]);
        assert!(prepared.encodings.is_empty());
    }

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0), Some(f64::NAN)],
            "y" => [Some(1.0), Some(2.0), None, Some(4.0)],
        ]
        .unwrap();

        let prepared = FeaturePreparer::prepare(&df, &names(&["a"]), "y").unwrap();
        assert_eq!(prepared.original_rows, 4);
        assert_eq!(prepared.retained_rows, 1);
        assert_eq!(prepared.dropped_rows(), 3);
        assert_eq!(prepared.target.to_vec(), vec![1.0]);
    }

    #[test]
    fn test_text_columns_are_label_encoded_in_sorted_order() {
        let df = df![
            "city" => ["paris", "berlin", "rome", "berlin"],
            "y" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();

        let prepared = FeaturePreparer::prepare(&df, &names(&["city"]), "y").unwrap();
        let codes: Vec<f64> = prepared.features.column(0).to_vec();
        assert_eq!(codes, vec![1.0, 0.0, 2.0, 0.0]);
        assert_eq!(
            prepared.encodings,
            vec![LabelEncoding {
                column: "city".to_string(),
                classes: names(&["berlin", "paris", "rome"]),
            }]
        );
    }

    #[test]
    fn test_repeated_preparation_encodes_identically() {
        let df = df![
            "city" => ["rome", "berlin", "paris", "rome", "oslo"],
            "rooms" => [2i64, 3, 1, 4, 2],
            "y" => [1.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();
        let features = names(&["city", "rooms"]);

        let first = FeaturePreparer::prepare(&df, &features, "y").unwrap();
        let second = FeaturePreparer::prepare(&df, &features, "y").unwrap();
        assert_eq!(first.features, second.features);
        assert_eq!(first.target, second.target);
        assert_eq!(first.encodings, second.encodings);

        let reversed = df![
            "city" => ["oslo", "rome", "paris", "berlin", "rome"],
            "rooms" => [2i64, 4, 1, 3, 2],
            "y" => [5.0, 4.0, 3.0, 2.0, 1.0],
        ]
        .unwrap();
        let third = FeaturePreparer::prepare(&reversed, &features, "y").unwrap();
        assert_eq!(third.encodings, first.encodings);
        let mut codes: Vec<f64> = third.features.column(0).to_vec();
        codes.reverse();
        assert_eq!(codes, first.features.column(0).to_vec());
    }

    #[test]
    fn test_encoding_ignores_dropped_rows() {
        let df = df![
            "city" => ["paris", "oslo", "rome"],
            "y" => [Some(1.0), None, Some(3.0)],
        ]
        .unwrap();

        let prepared = FeaturePreparer::prepare(&df, &names(&["city"]), "y").unwrap();
        assert_eq!(prepared.encodings[0].classes, names(&["paris", "rome"]));
    }

    #[test]
    fn test_booleans_become_zero_and_one() {
        let df = df![
            "flag" => [true, false, true],
            "y" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let prepared = FeaturePreparer::prepare(&df, &names(&["flag"]), "y").unwrap();
        assert_eq!(prepared.features.column(0).to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_text_target_is_encoded() {
        let df = df![
            "x" => [1.0, 2.0],
            "label" => ["b", "a"],
        ]
        .unwrap();

        let prepared = FeaturePreparer::prepare(&df, &names(&["x"]), "label").unwrap();
        assert_eq!(prepared.target.to_vec(), vec![1.0, 0.0]);
        assert_eq!(prepared.encodings[0].column, "label");
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let df = df!["a" => [1.0]].unwrap();
        let err = FeaturePreparer::prepare(&df, &names(&["a", "b"]), "c").unwrap_err();
        assert!(matches!(err, LearningError::ColumnsNotFound(ref cols) if cols == &names(&["b", "c"])));
    }

    #[test]
    fn test_target_in_features_is_rejected() {
        let df = df!["a" => [1.0]].unwrap();
        let err = FeaturePreparer::prepare(&df, &names(&["a"]), "a").unwrap_err();
        assert!(matches!(err, LearningError::TargetInFeatures(_)));
    }
}
