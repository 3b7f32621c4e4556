//! Best-effort batch loops over uploaded row sets
//!
//! Bulk update/delete runs as a sequential loop of independent single-row
//! calls. One failed row does not stop the remaining rows; every outcome is
//! collected and the batch only counts as successful if every row succeeded.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

use super::client::DatasetteClient;
use super::models::CallResult;
use crate::load::RowSet;

/// Outcome of one row within a batch. `row_number` is 1-based and counts
/// data rows in file order.
#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub row_number: usize,
    pub result: CallResult,
}

/// Collected outcomes of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.result.success)
    }

    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.success)
            .count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Update every row of the set, one request per row, matching on the chosen
/// primary key columns. Returns `Err` only for input errors detected before
/// any request is sent.
pub async fn update_rows(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    rows: &RowSet,
    pk_columns: &[String],
) -> Result<BatchReport> {
    check_pk_columns(rows, pk_columns)?;
    let mut report = BatchReport::default();
    for (idx, row) in rows.rows().iter().enumerate() {
        let result = match split_row(row, pk_columns) {
            Ok((pk_values, updates)) => {
                client.update_row(database, table, &pk_values, &updates).await
            }
            Err(e) => CallResult::error(e.to_string()),
        };
        report.outcomes.push(RowOutcome {
            row_number: idx + 1,
            result,
        });
    }
    Ok(report)
}

/// Delete every row of the set by primary key, one request per row.
pub async fn delete_rows(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    rows: &RowSet,
    pk_columns: &[String],
) -> Result<BatchReport> {
    check_pk_columns(rows, pk_columns)?;
    let mut report = BatchReport::default();
    for (idx, row) in rows.rows().iter().enumerate() {
        let result = match split_row(row, pk_columns) {
            Ok((pk_values, _)) => client.delete_row(database, table, &pk_values).await,
            Err(e) => CallResult::error(e.to_string()),
        };
        report.outcomes.push(RowOutcome {
            row_number: idx + 1,
            result,
        });
    }
    Ok(report)
}

/// Validate the chosen primary key columns against the row set's columns.
/// Runs before any network call.
fn check_pk_columns(rows: &RowSet, pk_columns: &[String]) -> Result<()> {
    if pk_columns.is_empty() {
        bail!("at least one primary key column is required");
    }
    let columns = rows.columns();
    for column in pk_columns {
        if !columns.contains(column) {
            bail!(
                "primary key column '{}' not found in file (columns: {})",
                column,
                columns.join(", ")
            );
        }
    }
    Ok(())
}

/// Split one row into its primary key values (in `pk_columns` order) and
/// the remaining update columns. Null cells are not sent as updates.
fn split_row(
    row: &Map<String, Value>,
    pk_columns: &[String],
) -> Result<(Vec<Value>, Map<String, Value>)> {
    let mut pk_values = Vec::with_capacity(pk_columns.len());
    for column in pk_columns {
        match row.get(column) {
            Some(value) if !value.is_null() => pk_values.push(value.clone()),
            _ => bail!("missing value for primary key column '{}'", column),
        }
    }
    let updates = row
        .iter()
        .filter(|(key, value)| !pk_columns.contains(key) && !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Ok((pk_values, updates))
}
