//! File ingestion
//!
//! Turns uploaded CSV and Excel files into [`RowSet`]s, the in-memory table
//! used as the payload for create/insert/update operations. Row order from
//! the source file is preserved and is the order submitted to the service.

mod csv;
mod excel;

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

pub use self::csv::{read_csv, read_csv_from};
pub use self::excel::read_excel;

/// Ordered rows parsed from an uploaded file. Each row maps column name to
/// a scalar JSON value; the column set is the union across rows.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    rows: Vec<Map<String, Value>>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, row: Map<String, Value>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of column names across all rows, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !seen.iter().any(|existing| existing == key) {
                    seen.push(key.clone());
                }
            }
        }
        seen
    }

    /// Rows as a JSON array of objects, original order preserved.
    pub fn to_json_rows(&self) -> Value {
        Value::Array(self.rows.iter().cloned().map(Value::Object).collect())
    }

    /// Build from a JSON array of row objects (the `?_shape=array` response).
    pub fn from_json_rows(value: &Value) -> Result<Self> {
        let array = value.as_array().context("expected a JSON array of rows")?;
        let mut rows = RowSet::new();
        for item in array {
            let object = item
                .as_object()
                .with_context(|| format!("expected a row object, got: {}", item))?;
            rows.push_row(object.clone());
        }
        Ok(rows)
    }
}

/// Load a tabular file, dispatching on its extension. Unsupported
/// extensions are rejected before any file or network access.
pub fn load_file(path: &Path) -> Result<RowSet> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => csv::read_csv(path),
        "xlsx" | "xls" => excel::read_excel(path),
        _ => bail!(
            "unsupported file format '{}': expected a .csv, .xlsx or .xls file",
            path.display()
        ),
    }
}

/// Infer a scalar JSON value from a raw text cell: empty becomes null,
/// `true`/`false` become booleans, numerics become numbers, everything
/// else stays a string.
pub(crate) fn infer_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        return Value::from(float);
    }
    Value::String(raw.to_string())
}
