//! File-backed row sources.

use std::fs::File;
use std::path::Path;

use habitline_core::{CellValue, RawRow};
use thiserror::Error;

/// Errors raised while reading a rows file.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON rows in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid CSV rows in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported rows file {0} (expected .json or .csv)")]
    UnsupportedFormat(String),
}

/// Reads rows from a `.json` array of objects or a `.csv` file with headers.
///
/// CSV cells that look numeric become numbers unless `keep_text` is set.
pub fn read_rows(path: &str, keep_text: bool) -> Result<Vec<RawRow>, SourceError> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => read_json(path),
        Some("csv") => read_csv(path, keep_text),
        _ => Err(SourceError::UnsupportedFormat(path.to_string())),
    }
}

fn read_json(path: &str) -> Result<Vec<RawRow>, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SourceError::Json {
        path: path.to_string(),
        source,
    })
}

fn read_csv(path: &str, keep_text: bool) -> Result<Vec<RawRow>, SourceError> {
    let csv_error = |source: csv::Error| SourceError::Csv {
        path: path.to_string(),
        source,
    };
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column, to_cell(cell, keep_text)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Converts CSV text to a cell, turning numeric-looking text into a number.
fn to_cell(text: &str, keep_text: bool) -> CellValue {
    if keep_text {
        return CellValue::from(text);
    }
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return CellValue::from(n);
    }
    let looks_decimal = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    match trimmed.parse::<f64>() {
        Ok(n) if looks_decimal && n.is_finite() => CellValue::from(n),
        _ => CellValue::from(text),
    }
}

#[cfg(test)]
mod tests {
    use super::to_cell;
    use habitline_core::CellValue;

    #[test]
    fn numeric_text_becomes_number() {
        assert_eq!(to_cell("8", false), CellValue::Number(8.0));
        assert_eq!(to_cell(" 2.5 ", false), CellValue::Number(2.5));
        assert_eq!(to_cell("45891", false), CellValue::Number(45891.0));
    }

    #[test]
    fn other_text_is_kept() {
        assert_eq!(to_cell("8/22/2025", false), CellValue::from("8/22/2025"));
        assert_eq!(to_cell("Yes", false), CellValue::from("Yes"));
        assert_eq!(to_cell("inf", false), CellValue::from("inf"));
        assert_eq!(to_cell("", false), CellValue::from(""));
        assert_eq!(to_cell("8", true), CellValue::from("8"));
    }
}
