//! Excel ingestion

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use serde_json::{Map, Value, json};

use super::RowSet;

/// Read the first worksheet of an Excel file (`.xlsx` or `.xls`) into a
/// row set. The first row is the header row; fully blank rows are skipped.
pub fn read_excel(path: &Path) -> Result<RowSet> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("Excel file has no worksheets: {}", path.display()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(RowSet::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
        .collect();

    let mut rows = RowSet::new();
    for row in rows_iter {
        let mut out = Map::new();
        let mut has_value = false;
        for (idx, cell) in row.iter().enumerate() {
            let Some(header) = headers.get(idx) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            let value = cell_to_value(cell);
            if !value.is_null() {
                has_value = true;
            }
            out.insert(header.clone(), value);
        }
        if !has_value {
            continue;
        }
        rows.push_row(out);
    }
    Ok(rows)
}

/// Convert an Excel cell to a scalar JSON value.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => {
            match s.to_lowercase().as_str() {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            }
            Value::String(s.clone())
        }
        Data::Int(i) => json!(*i),
        Data::Float(f) => {
            // Whole numbers come back as floats; keep them integral
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::String(format!("{}", dt)),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "id").unwrap();
        worksheet.write_string(0, 1, "name").unwrap();
        worksheet.write_string(0, 2, "active").unwrap();
        worksheet.write_number(1, 0, 1.0).unwrap();
        worksheet.write_string(1, 1, "ada").unwrap();
        worksheet.write_boolean(1, 2, true).unwrap();
        worksheet.write_number(2, 0, 2.5).unwrap();
        worksheet.write_string(2, 1, "grace").unwrap();
        // row 3 left entirely blank, row 4 partially filled
        worksheet.write_number(4, 0, 3.0).unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_excel_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");
        write_fixture(&path);

        let rows = read_excel(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.columns(), vec!["id", "name", "active"]);

        let first = &rows.rows()[0];
        assert_eq!(first.get("id"), Some(&json!(1)));
        assert_eq!(first.get("name"), Some(&json!("ada")));
        assert_eq!(first.get("active"), Some(&json!(true)));

        // Non-integral floats stay floats, missing cells are null
        let second = &rows.rows()[1];
        assert_eq!(second.get("id"), Some(&json!(2.5)));
        assert_eq!(second.get("active"), Some(&json!(null)));

        // The blank row was skipped entirely
        assert_eq!(rows.rows()[2].get("id"), Some(&json!(3)));
    }

    #[test]
    fn test_cell_to_value() {
        assert_eq!(cell_to_value(&Data::Empty), json!(null));
        assert_eq!(cell_to_value(&Data::String(String::new())), json!(null));
        assert_eq!(cell_to_value(&Data::String("True".into())), json!(true));
        assert_eq!(cell_to_value(&Data::String("x".into())), json!("x"));
        assert_eq!(cell_to_value(&Data::Int(4)), json!(4));
        assert_eq!(cell_to_value(&Data::Float(4.0)), json!(4));
        assert_eq!(cell_to_value(&Data::Float(4.25)), json!(4.25));
        assert_eq!(cell_to_value(&Data::Bool(false)), json!(false));
    }
}
