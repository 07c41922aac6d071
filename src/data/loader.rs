use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::filter::OUTCOME_COLUMN;
use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Failure while reading or parsing a dataset file. Fatal at startup,
/// reported as a status message when triggered from File → Open.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("failed to decode Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("malformed input: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one record per row
/// * `.json`    – records-oriented array: `[{ "Glucose": 100, ... }, ...]`
/// * `.parquet` – flat table, one column per field
///
/// After parsing, rows containing missing values and exact duplicate rows
/// are dropped; nothing else is transformed.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Cleaning: drop rows with missing values, then exact duplicates
// ---------------------------------------------------------------------------

fn clean(raw: Vec<Row>) -> (Vec<Row>, usize, usize) {
    let total = raw.len();
    let mut seen: HashSet<Row> = HashSet::with_capacity(total);
    let mut kept = Vec::with_capacity(total);
    let mut dropped_missing = 0;

    for row in raw {
        if row.iter().any(CellValue::is_null) {
            dropped_missing += 1;
            continue;
        }
        if seen.insert(row.clone()) {
            kept.push(row);
        }
    }

    let dropped_duplicates = total - dropped_missing - kept.len();
    (kept, dropped_missing, dropped_duplicates)
}

fn finish(columns: Vec<String>, raw: Vec<Row>) -> Dataset {
    let total = raw.len();
    let (rows, dropped_missing, dropped_duplicates) = clean(raw);

    if !columns.iter().any(|c| c == OUTCOME_COLUMN) {
        log::warn!(
            "dataset has no '{OUTCOME_COLUMN}' column; outcome filtering and grouping disabled"
        );
    }
    log::info!(
        "Loaded {} of {total} rows ({dropped_missing} with missing values, \
         {dropped_duplicates} duplicates dropped), columns {columns:?}",
        rows.len()
    );

    Dataset::new(columns, rows)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut raw = Vec::new();
    for result in reader.records() {
        let record = result?;
        raw.push(record.iter().map(parse_cell).collect());
    }

    Ok(finish(columns, raw))
}

/// Type inference for one CSV cell. Empty cells and the usual NA spellings
/// become `Null` so the cleaning pass drops their rows.
fn parse_cell(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || matches!(s.to_ascii_lowercase().as_str(), "na" | "n/a" | "nan" | "null") {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Glucose": 100, "BMI": 25.0, "Age": 30, "Outcome": 0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array of records".into()))?;

    // Column set is the union of keys over all records.
    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut raw = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        raw.push(
            columns
                .iter()
                .map(|c| obj.get(c).map_or(CellValue::Null, json_to_cell))
                .collect(),
        );
    }

    Ok(finish(columns, raw))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::String(s) => CellValue::Text(s.clone()),
        // Boolean outcomes coerce to 0/1 so the outcome filter still applies.
        JsonValue::Bool(b) => CellValue::Integer(*b as i64),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table.  Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut raw: Vec<Row> = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            raw.push(
                (0..batch.num_columns())
                    .map(|c| extract_cell(batch.column(c), row))
                    .collect(),
            );
        }
    }

    Ok(finish(columns, raw))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::Text(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, OutcomeFilter};

    fn write_and_load(name: &str, contents: &str) -> Result<Dataset, LoadError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        load_file(&path)
    }

    #[test]
    fn csv_cells_infer_types() {
        assert_eq!(parse_cell("100"), CellValue::Integer(100));
        assert_eq!(parse_cell("33.6"), CellValue::Float(33.6));
        assert_eq!(parse_cell("positive"), CellValue::Text("positive".into()));
        assert_eq!(parse_cell(""), CellValue::Null);
        assert_eq!(parse_cell("NaN"), CellValue::Null);
    }

    #[test]
    fn duplicate_and_missing_rows_are_dropped() {
        let ds = write_and_load(
            "data.csv",
            "Glucose,BMI,Age,Outcome\n\
             100,25,30,0\n\
             150,32,45,1\n\
             100,25,30,0\n\
             140,,50,1\n",
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns, vec!["Glucose", "BMI", "Age", "Outcome"]);
        assert_eq!(ds.rows[0][0], CellValue::Integer(100));
        assert_eq!(ds.rows[1][0], CellValue::Integer(150));
    }

    #[test]
    fn worked_example_filters_to_one_negative_row() {
        // Third row duplicates the first; two rows survive, one is negative.
        let ds = write_and_load(
            "data.csv",
            "Glucose,BMI,Age,Outcome\n\
             100,25,30,0\n\
             150,32,45,1\n\
             100,25,30,0\n",
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        let negative = filtered_indices(&ds, OutcomeFilter::Negative);
        assert_eq!(negative.len(), 1);
        assert_eq!(ds.rows[negative[0]][0], CellValue::Integer(100));
    }

    #[test]
    fn surviving_rows_are_preserved_exactly() {
        let ds = write_and_load(
            "data.csv",
            "Glucose,BMI,Outcome\n88,23.1,0\n88,23.1,0\n99,NA,1\n101,30.5,1\n",
        )
        .unwrap();
        assert_eq!(
            ds.rows,
            vec![
                vec![
                    CellValue::Integer(88),
                    CellValue::Float(23.1),
                    CellValue::Integer(0)
                ],
                vec![
                    CellValue::Integer(101),
                    CellValue::Float(30.5),
                    CellValue::Integer(1)
                ],
            ]
        );
    }

    #[test]
    fn json_records_load_with_booleans_as_integers() {
        let ds = write_and_load(
            "data.json",
            r#"[
                {"Age": 30, "BMI": 25.0, "Outcome": false},
                {"Age": 45, "BMI": 32.0, "Outcome": true},
                {"Age": 45, "BMI": 32.0, "Outcome": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        let outcome = ds.column_index("Outcome").unwrap();
        assert_eq!(ds.rows[1][outcome], CellValue::Integer(1));
    }

    #[test]
    fn json_records_missing_a_key_are_dropped() {
        let ds = write_and_load(
            "data.json",
            r#"[{"Age": 30, "Outcome": 0}, {"Age": 45}]"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = write_and_load("data.xlsx", "nope").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/does/not/exist.csv")).is_err());
    }
}
