//! Categorical-to-numeric dataset encoding
//!
//! The pipeline runs in a fixed order because later steps depend on
//! earlier ones: binary and ordinal columns are mapped in place first,
//! which turns their unknown labels into nulls; those nulls are then
//! numeric and get the column median during the fill step, not the mode.
//!
//! Known limitation: indicator expansion only covers the categories
//! observed in the encoded file. A category first seen at prediction time
//! has no indicator column and is indistinguishable from the dropped
//! reference level.

use crate::error::{Result, ScorecastError};
use crate::schema::{EncodingSchema, UnknownLabelPolicy};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::loader;

/// Summary returned after a dataset has been prepared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareSummary {
    #[serde(rename = "filas")]
    pub rows: usize,
    #[serde(rename = "columnas")]
    pub columns: usize,
    #[serde(rename = "archivo_salida")]
    pub output_path: String,
    #[serde(rename = "columnas_eliminadas")]
    pub dropped_columns: Vec<String>,
    #[serde(rename = "dummies_generadas")]
    pub indicator_columns: Vec<String>,
}

/// Encodes raw datasets into fully numeric tables.
#[derive(Debug, Clone)]
pub struct DatasetEncoder {
    schema: EncodingSchema,
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl DatasetEncoder {
    pub fn new(schema: EncodingSchema, raw_dir: PathBuf, processed_dir: PathBuf) -> Self {
        Self {
            schema,
            raw_dir,
            processed_dir,
        }
    }

    /// Load `<raw_dir>/<filename>`, encode it, persist the result as
    /// `<processed_dir>/<stem>_clean.csv`, and return it with a summary.
    ///
    /// The output file is written only after every encoding step has
    /// succeeded; a failure leaves no partial file behind.
    pub fn prepare(&self, filename: &str) -> Result<(DataFrame, PrepareSummary)> {
        let raw_path = self.raw_dir.join(filename);
        if !raw_path.exists() {
            return Err(ScorecastError::NotFound(format!(
                "raw dataset {} (expected at {})",
                filename,
                raw_path.display()
            )));
        }

        let df = loader::load_csv(&raw_path)?;
        let (mut encoded, dropped, indicators) = self.encode(df)?;

        std::fs::create_dir_all(&self.processed_dir)?;
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let output_path = self.processed_dir.join(format!("{stem}_clean.csv"));
        loader::write_csv(&mut encoded, &output_path)?;

        let summary = PrepareSummary {
            rows: encoded.height(),
            columns: encoded.width(),
            output_path: output_path.display().to_string(),
            dropped_columns: dropped,
            indicator_columns: indicators,
        };
        Ok((encoded, summary))
    }

    /// Run the in-memory encoding steps on an already-loaded table.
    ///
    /// Returns the encoded table, the dropped columns, and the generated
    /// indicator columns.
    pub fn encode(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>, Vec<String>)> {
        let (df, dropped) = self.drop_irrelevant(df)?;
        let df = self.map_binary(df)?;
        let df = self.map_ordinal(df)?;
        let (df, indicators) = self.expand_nominal(df)?;
        let df = self.fill_missing(df)?;
        let df = self.coerce_declared_numeric(df)?;
        Ok((df, dropped, indicators))
    }

    fn drop_irrelevant(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut result = df;
        let mut dropped = Vec::new();
        for col in &self.schema.drop {
            if result.column(col).is_ok() {
                result = result.drop(col)?;
                dropped.push(col.clone());
            }
        }
        Ok((result, dropped))
    }

    fn map_binary(&self, df: DataFrame) -> Result<DataFrame> {
        let mut result = df;
        for col_name in &self.schema.binary {
            result = self.map_column(result, col_name, &self.schema.binary_map)?;
        }
        Ok(result)
    }

    fn map_ordinal(&self, df: DataFrame) -> Result<DataFrame> {
        let mut result = df;
        let mut columns: Vec<&String> = self.schema.ordinal.keys().collect();
        columns.sort();
        for col_name in columns {
            result = self.map_column(result, col_name, &self.schema.ordinal[col_name.as_str()])?;
        }
        Ok(result)
    }

    /// Replace one column's labels by their integer codes.
    ///
    /// A column absent from the table, or already numeric, is left alone.
    /// Unknown labels become nulls under the `Coerce` policy and a
    /// validation error under `Fail`.
    fn map_column(
        &self,
        df: DataFrame,
        col_name: &str,
        map: &HashMap<String, i64>,
    ) -> Result<DataFrame> {
        if df.column(col_name).is_err() {
            return Ok(df);
        }
        let series = df.column(col_name)?.as_materialized_series().clone();
        let Ok(ca) = series.str() else {
            return Ok(df);
        };

        if self.schema.unknown_labels == UnknownLabelPolicy::Fail {
            for val in ca.into_iter().flatten() {
                if !map.contains_key(val) {
                    return Err(ScorecastError::Validation(format!(
                        "unknown label '{val}' in column '{col_name}'"
                    )));
                }
            }
        }

        let codes: Vec<Option<i64>> = ca
            .into_iter()
            .map(|v| v.and_then(|s| map.get(s).copied()))
            .collect();

        let mapped = Series::new(col_name.into(), codes);
        let mut result = df;
        result = result.with_column(mapped)?.clone();
        Ok(result)
    }

    /// Expand each nominal column into one indicator column per observed
    /// value, dropping the first (sorted) value as the reference level,
    /// then remove the original column. A null row gets all zeros.
    fn expand_nominal(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut result = df;
        let mut generated = Vec::new();

        for col_name in &self.schema.one_hot {
            let Ok(column) = result.column(col_name) else {
                continue;
            };
            let series = column.as_materialized_series().clone();
            let Ok(ca) = series.str() else {
                continue;
            };

            let mut levels: Vec<String> = ca.into_iter().flatten().map(str::to_string).collect();
            levels.sort();
            levels.dedup();

            for level in levels.iter().skip(1) {
                let indicator_name = format!("{col_name}_{level}");
                let values: Vec<i32> = ca
                    .into_iter()
                    .map(|v| i32::from(v == Some(level.as_str())))
                    .collect();
                let indicator = Series::new(indicator_name.as_str().into(), values);
                result = result.with_column(indicator)?.clone();
                generated.push(indicator_name);
            }

            result = result.drop(col_name)?;
        }

        Ok((result, generated))
    }

    /// Fill nulls: numeric columns with their median, text columns with
    /// their mode (or the schema's fallback label when no mode exists).
    fn fill_missing(&self, df: DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for col in df.get_columns() {
            if col.null_count() == 0 {
                continue;
            }
            let series = col.as_materialized_series();

            let filled = if is_numeric_dtype(series.dtype()) {
                let ca = series.cast(&DataType::Float64)?;
                let ca = ca.f64()?;
                let median = ca.median().unwrap_or(0.0);
                let values: Float64Chunked = ca
                    .into_iter()
                    .map(|v| Some(v.unwrap_or(median)))
                    .collect();
                values.with_name(series.name().clone()).into_series()
            } else if let Ok(ca) = series.str() {
                let fill = Self::mode_string(ca)
                    .unwrap_or_else(|| self.schema.missing_label.clone());
                let values: StringChunked = ca
                    .into_iter()
                    .map(|v| Some(v.unwrap_or(&fill).to_string()))
                    .collect();
                values.with_name(series.name().clone()).into_series()
            } else {
                continue;
            };

            result = result.with_column(filled)?.clone();
        }

        Ok(result)
    }

    /// Most frequent non-null value; ties go to the smallest label so the
    /// result does not depend on hash order.
    fn mode_string(ca: &StringChunked) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for val in ca.into_iter().flatten() {
            *counts.entry(val).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(v, _)| v.to_string())
    }

    /// Force declared-numeric columns that are still textual into floats;
    /// unparsable values become nulls and then the column median.
    fn coerce_declared_numeric(&self, df: DataFrame) -> Result<DataFrame> {
        let mut result = df;

        for col_name in &self.schema.numeric {
            let Ok(column) = result.column(col_name) else {
                continue;
            };
            if is_numeric_dtype(column.dtype()) {
                continue;
            }
            let series = column.as_materialized_series().clone();
            let Ok(ca) = series.str() else {
                continue;
            };

            let parsed: Vec<Option<f64>> = ca
                .into_iter()
                .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
                .collect();

            let mut present: Vec<f64> = parsed.iter().flatten().copied().collect();
            let median = Self::median(&mut present);

            let values: Vec<f64> = parsed.into_iter().map(|v| v.unwrap_or(median)).collect();
            let coerced = Series::new(col_name.as_str().into(), values);
            result = result.with_column(coerced)?.clone();
        }

        Ok(result)
    }

    fn median(sorted: &mut [f64]) -> f64 {
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        match sorted.len() {
            0 => 0.0,
            n if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
            n => sorted[n / 2],
        }
    }
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EncodingSchema;

    fn encoder() -> DatasetEncoder {
        DatasetEncoder::new(
            EncodingSchema::student_performance(),
            PathBuf::from("/tmp/raw"),
            PathBuf::from("/tmp/processed"),
        )
    }

    #[test]
    fn test_binary_mapping() {
        let df = df!(
            "Extracurricular_Activities" => &["Yes", "No", "Yes"],
            "Exam_Score" => &[70i64, 80, 90],
        )
        .unwrap();

        let (encoded, _, _) = encoder().encode(df).unwrap();
        let col = encoded
            .column("Extracurricular_Activities")
            .unwrap()
            .i64()
            .unwrap();
        let values: Vec<i64> = col.into_iter().flatten().collect();
        assert_eq!(values, vec![1, 0, 1]);
    }

    #[test]
    fn test_ordinal_ranks() {
        let df = df!(
            "Parental_Involvement" => &["Low", "Medium", "High"],
            "Exam_Score" => &[60i64, 70, 80],
        )
        .unwrap();

        let (encoded, _, _) = encoder().encode(df).unwrap();
        let col = encoded.column("Parental_Involvement").unwrap().i64().unwrap();
        let values: Vec<i64> = col.into_iter().flatten().collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn test_one_hot_drops_first_level() {
        let df = df!(
            "School_Type" => &["Public", "Private", "Public", "Private"],
            "Exam_Score" => &[60i64, 70, 80, 90],
        )
        .unwrap();

        let (encoded, _, indicators) = encoder().encode(df).unwrap();
        // "Private" sorts first and is the dropped reference level.
        assert_eq!(indicators, vec!["School_Type_Public".to_string()]);
        assert!(encoded.column("School_Type").is_err());

        let col = encoded.column("School_Type_Public").unwrap().i32().unwrap();
        let values: Vec<i32> = col.into_iter().flatten().collect();
        assert_eq!(values, vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_one_hot_k_minus_one_columns() {
        let df = df!(
            "Gender" => &["Female", "Male", "Other", "Female"],
            "Exam_Score" => &[60i64, 70, 80, 90],
        )
        .unwrap();

        let (encoded, _, indicators) = encoder().encode(df).unwrap();
        assert_eq!(indicators.len(), 2); // 3 observed levels -> 2 indicators

        // At most one indicator set per row.
        for row in 0..encoded.height() {
            let mut set = 0;
            for name in &indicators {
                let v = encoded.column(name).unwrap().i32().unwrap().get(row).unwrap();
                set += v;
            }
            assert!(set <= 1, "row {row} has {set} indicators set");
        }
    }

    #[test]
    fn test_unknown_binary_label_becomes_median() {
        let df = df!(
            "Internet_Access" => &["Yes", "Maybe", "Yes", "No"],
            "Exam_Score" => &[60i64, 70, 80, 90],
        )
        .unwrap();

        let (encoded, _, _) = encoder().encode(df).unwrap();
        let col = encoded.column("Internet_Access").unwrap().f64().unwrap();
        // Known labels map to [1, _, 1, 0]; the unknown slot gets the
        // column median of {1, 1, 0} = 1.
        assert_eq!(col.get(1), Some(1.0));
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_unknown_label_policy_fail() {
        let schema = EncodingSchema::student_performance()
            .with_unknown_labels(UnknownLabelPolicy::Fail);
        let enc = DatasetEncoder::new(
            schema,
            PathBuf::from("/tmp/raw"),
            PathBuf::from("/tmp/processed"),
        );

        let df = df!(
            "Internet_Access" => &["Yes", "Maybe"],
            "Exam_Score" => &[60i64, 70],
        )
        .unwrap();

        let err = enc.encode(df).unwrap_err();
        assert!(matches!(err, ScorecastError::Validation(_)));
    }

    #[test]
    fn test_numeric_median_fill() {
        let df = df!(
            "Hours_Studied" => &[Some(2.0), None, Some(10.0)],
            "Exam_Score" => &[60i64, 70, 80],
        )
        .unwrap();

        let (encoded, _, _) = encoder().encode(df).unwrap();
        let col = encoded.column("Hours_Studied").unwrap().f64().unwrap();
        assert_eq!(col.get(1), Some(6.0)); // median of {2, 10}
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_drop_id_column() {
        let df = df!(
            "id" => &[1i64, 2, 3],
            "Exam_Score" => &[60i64, 70, 80],
        )
        .unwrap();

        let (encoded, dropped, _) = encoder().encode(df).unwrap();
        assert_eq!(dropped, vec!["id".to_string()]);
        assert!(encoded.column("id").is_err());
    }

    #[test]
    fn test_all_numeric_table_unchanged() {
        let df = df!(
            "Hours_Studied" => &[1.0, 2.0, 3.0],
            "Exam_Score" => &[60.0, 70.0, 80.0],
        )
        .unwrap();

        let (encoded, dropped, indicators) = encoder().encode(df.clone()).unwrap();
        assert!(dropped.is_empty());
        assert!(indicators.is_empty());
        assert_eq!(encoded.height(), df.height());
        assert_eq!(encoded.width(), df.width());
        assert!(encoded.equals(&df));
    }

    #[test]
    fn test_coerce_textual_numeric_column() {
        let df = df!(
            "Attendance" => &["90", "85", "bad", "95"],
            "Exam_Score" => &[60i64, 70, 80, 90],
        )
        .unwrap();

        let (encoded, _, _) = encoder().encode(df).unwrap();
        let col = encoded.column("Attendance").unwrap().f64().unwrap();
        assert_eq!(col.get(0), Some(90.0));
        assert_eq!(col.get(2), Some(90.0)); // median of {90, 85, 95}
    }
}
