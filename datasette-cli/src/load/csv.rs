//! CSV ingestion

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde_json::Map;

use super::{RowSet, infer_scalar};

/// Read a CSV file into a row set. The first record is the header row.
pub fn read_csv(path: &Path) -> Result<RowSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    read_csv_from(file)
}

/// Read CSV data from any reader.
pub fn read_csv_from<R: Read>(reader: R) -> Result<RowSet> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = RowSet::new();
    for (idx, record) in csv_reader.records().enumerate() {
        // Line 1 is the header row
        let record =
            record.with_context(|| format!("Failed to parse CSV record on line {}", idx + 2))?;
        let mut row = Map::new();
        for (col, field) in record.iter().enumerate() {
            let Some(header) = headers.get(col) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            row.insert(header.clone(), infer_scalar(field));
        }
        rows.push_row(row);
    }
    Ok(rows)
}
