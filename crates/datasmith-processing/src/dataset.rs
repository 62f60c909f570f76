//! Dataset construction and file I/O.
//!
//! Datasets arrive either as JSON records (an array of objects mapping column
//! name to scalar) or as files on disk. Both end up as a polars [`DataFrame`]
//! whose column order is the order in which columns were first seen.

use crate::error::{ProcessingError, Result, ResultExt};
use polars::prelude::*;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Supported on-disk dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
    /// A JSON array of record objects.
    Json,
}

impl DatasetFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Column type inferred from the non-null JSON values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordColumnType {
    Boolean,
    Int64,
    Float64,
    String,
}

fn infer_column_type(values: &[Option<&Value>]) -> RecordColumnType {
    let mut present = values.iter().flatten().filter(|v| !v.is_null()).peekable();
    if present.peek().is_none() {
        return RecordColumnType::String;
    }

    let (mut all_bool, mut all_int, mut all_number) = (true, true, true);
    for v in present {
        all_bool &= v.is_boolean();
        all_int &= v.is_i64();
        all_number &= v.is_number();
    }

    if all_bool {
        RecordColumnType::Boolean
    } else if all_int {
        RecordColumnType::Int64
    } else if all_number {
        RecordColumnType::Float64
    } else {
        RecordColumnType::String
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Build a DataFrame from JSON records.
///
/// Column types: all booleans become `Boolean`, all integers `Int64`, any
/// other all-numeric column `Float64`, and everything else `String`. A key
/// missing from a record is a null in that row.
pub fn records_to_dataframe(records: &[Value]) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| {
            ProcessingError::Validation(format!("Record {i} is not a JSON object"))
        })?;
        for key in object.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let columns = names
        .iter()
        .map(|&name| {
            let values: Vec<Option<&Value>> = records
                .iter()
                .map(|r| r.get(name).filter(|v| !v.is_null()))
                .collect();
            let series = match infer_column_type(&values) {
                RecordColumnType::Boolean => {
                    let col: Vec<Option<bool>> =
                        values.iter().map(|v| v.and_then(Value::as_bool)).collect();
                    Series::new(name.into(), col)
                }
                RecordColumnType::Int64 => {
                    let col: Vec<Option<i64>> =
                        values.iter().map(|v| v.and_then(Value::as_i64)).collect();
                    Series::new(name.into(), col)
                }
                RecordColumnType::Float64 => {
                    let col: Vec<Option<f64>> =
                        values.iter().map(|v| v.and_then(Value::as_f64)).collect();
                    Series::new(name.into(), col)
                }
                RecordColumnType::String => {
                    let col: Vec<Option<String>> =
                        values.iter().map(|v| v.and_then(value_as_text)).collect();
                    Series::new(name.into(), col)
                }
            };
            Column::from(series)
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns).context("Building dataset from records")
}

/// Parse a JSON document holding an array of records.
pub fn records_from_json(json: &str) -> Result<DataFrame> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(records) => records_to_dataframe(&records),
        _ => Err(ProcessingError::Validation(
            "Dataset JSON must be an array of records".to_string(),
        )),
    }
}

/// Read a dataset from a `.csv`, `.parquet` or `.json` file.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProcessingError::DataAccess(format!(
            "Dataset not found: {}",
            path.display()
        )));
    }

    let format = DatasetFormat::from_path(path).ok_or_else(|| {
        ProcessingError::DataAccess(format!(
            "Unsupported dataset format: {} (expected .csv, .parquet or .json)",
            path.display()
        ))
    })?;

    debug!("Reading {:?} dataset from {}", format, path.display());

    let df = match format {
        DatasetFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        DatasetFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
        DatasetFormat::Json => records_from_json(&std::fs::read_to_string(path)?)?,
    };

    Ok(df)
}

/// Write a dataset as CSV with a header row.
pub fn write_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .context("Writing CSV")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_infer_column_types() {
        let records = vec![
            json!({"id": 1, "price": 2.5, "name": "a", "ok": true}),
            json!({"id": 2, "price": 3, "name": null, "ok": false}),
            json!({"id": 3, "name": "c", "ok": null}),
        ];

        let df = records_to_dataframe(&records).unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["id", "price", "name", "ok"]);
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("ok").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("price").unwrap().null_count(), 1);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_mixed_values_become_text() {
        let records = vec![json!({"v": 1}), json!({"v": "two"}), json!({"v": true})];
        let df = records_to_dataframe(&records).unwrap();
        let series = df.column("v").unwrap().as_materialized_series();
        let values: Vec<Option<&str>> = series.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("1"), Some("two"), Some("true")]);
    }

    #[test]
    fn test_all_null_column_is_text() {
        let records = vec![json!({"v": null}), json!({"v": null})];
        let df = records_to_dataframe(&records).unwrap();
        assert_eq!(df.column("v").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("v").unwrap().null_count(), 2);
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        let err = records_to_dataframe(&[json!([1, 2])]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_records_from_json_requires_array() {
        assert!(records_from_json(r#"{"a": 1}"#).is_err());
        let df = records_from_json(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_read_missing_file_is_data_access_error() {
        let err = read_dataset("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DataAccess);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/b.CSV")),
            Some(DatasetFormat::Csv)
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("b.parquet")),
            Some(DatasetFormat::Parquet)
        );
        assert_eq!(DatasetFormat::from_path(Path::new("b.xlsx")), None);
    }
}
