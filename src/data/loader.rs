//! CSV loading and saving

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a CSV file with header and schema inference.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScorecastError::NotFound(path.display().to_string()),
        _ => ScorecastError::Processing(e.to_string()),
    })?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| ScorecastError::Processing(e.to_string()))
}

/// Write a DataFrame as a headered CSV file.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| ScorecastError::Processing(e.to_string()))?;
    Ok(())
}
