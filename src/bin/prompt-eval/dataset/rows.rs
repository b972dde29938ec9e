use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::error::DatasetError;

pub type Row = Map<String, Value>;

/// Reads a dataset stored either as one JSON array of objects or as JSON
/// lines with one object per line.
pub fn load_rows(path: &Path) -> Result<Vec<Row>, DatasetError> {
    let contents = fs::read_to_string(path)?;
    parse_rows(&contents)
}

fn parse_rows(contents: &str) -> Result<Vec<Row>, DatasetError> {
    if contents.trim_start().starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(contents).map_err(|source| DatasetError::Json {
                line: source.line(),
                source,
            })?;
        return values
            .into_iter()
            .enumerate()
            .map(|(index, value)| into_row(index, value))
            .collect();
    }

    let mut rows = Vec::new();
    for (line_index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|source| DatasetError::Json {
            line: line_index + 1,
            source,
        })?;
        rows.push(into_row(rows.len(), value)?);
    }
    Ok(rows)
}

fn into_row(index: usize, value: Value) -> Result<Row, DatasetError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DatasetError::NotAnObject(index)),
    }
}

/// Resolves the inclusive `start..=end` window over `len` rows. `end` is
/// clamped to the last row; an empty dataset yields an empty window.
pub fn select_rows(
    len: usize,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<std::ops::Range<usize>, DatasetError> {
    let start_row = start.unwrap_or(0);
    if len == 0 && start.is_none() && end.is_none() {
        return Ok(0..0);
    }
    let last = len.saturating_sub(1);
    let end_row = end.map_or(last, |end| end.min(last));
    if len == 0 || start_row > end_row {
        return Err(DatasetError::EmptyRange {
            start: start_row,
            end: end.unwrap_or(last),
            len,
        });
    }
    Ok(start_row..end_row + 1)
}
