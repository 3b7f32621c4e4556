//! Subcommand handlers
//!
//! Each handler loads its inputs, issues the API calls and renders a
//! human-readable report. Failures become `Err` so the process exits
//! non-zero, but a batch always runs to completion first.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::*;
use serde_json::Value;

use super::OutputFormat;
use crate::api::{BatchReport, CallResult, DatasetteClient, batch};
use crate::load::{self, RowSet};

pub async fn databases(client: &DatasetteClient) -> Result<()> {
    let names = client.list_databases().await?;
    if names.is_empty() {
        println!("{}", "No databases found.".yellow());
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub async fn tables(client: &DatasetteClient, database: &str) -> Result<()> {
    let names = client.list_tables(database).await?;
    if names.is_empty() {
        println!("{}", format!("No tables found in '{}'.", database).yellow());
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub async fn schema(client: &DatasetteClient, database: &str, table: &str) -> Result<()> {
    let columns = client.table_schema(database, table).await?;
    for column in columns {
        match column.details.get("type").and_then(Value::as_str) {
            Some(column_type) => println!("{} {}", column.name, column_type.dimmed()),
            None => println!("{}", column.name),
        }
    }
    Ok(())
}

pub async fn rows(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    format: OutputFormat,
) -> Result<()> {
    let rows = client.all_rows(database, table).await?;
    print!("{}", format_rows(&rows, format)?);
    Ok(())
}

pub async fn create(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    file: &Path,
) -> Result<()> {
    let rows = load::load_file(file)?;
    println!("Loaded {} rows from {}", rows.len(), file.display());
    let result = client.create_table(database, table, &rows).await;
    report_call(
        &result,
        &format!("Table '{}' created with {} rows", table, rows.len()),
        "Failed to create table",
    )
}

pub async fn insert(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    file: &Path,
) -> Result<()> {
    let rows = load::load_file(file)?;
    if rows.is_empty() {
        bail!("No data rows found in {}", file.display());
    }
    println!("Loaded {} rows from {}", rows.len(), file.display());
    let result = client.insert_rows(database, table, &rows).await;
    report_call(
        &result,
        &format!("Inserted {} rows into '{}'", rows.len(), table),
        "Failed to insert rows",
    )
}

pub async fn update(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    file: &Path,
    pk_columns: &[String],
) -> Result<()> {
    let rows = load::load_file(file)?;
    if rows.is_empty() {
        bail!("No data rows found in {}", file.display());
    }
    println!(
        "Updating {} rows in '{}/{}'...",
        rows.len(),
        database,
        table
    );
    let report = batch::update_rows(client, database, table, &rows, pk_columns).await?;
    report_batch(&report, "updated")
}

pub async fn delete(
    client: &DatasetteClient,
    database: &str,
    table: &str,
    file: &Path,
    pk_columns: &[String],
) -> Result<()> {
    let rows = load::load_file(file)?;
    if rows.is_empty() {
        bail!("No data rows found in {}", file.display());
    }
    println!(
        "Deleting {} rows from '{}/{}'...",
        rows.len(),
        database,
        table
    );
    let report = batch::delete_rows(client, database, table, &rows, pk_columns).await?;
    report_batch(&report, "deleted")
}

pub async fn drop(client: &DatasetteClient, database: &str, table: &str, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "Refusing to drop '{}/{}' without --yes \
             (this permanently deletes the table and all of its data)",
            database,
            table
        );
    }
    let result = client.drop_table(database, table, true).await;
    report_call(
        &result,
        &format!("Table '{}' dropped", table),
        "Failed to drop table",
    )
}

fn report_call(result: &CallResult, success_message: &str, failure_prefix: &str) -> Result<()> {
    if result.success {
        println!("{} {}", "OK".green().bold(), success_message);
        Ok(())
    } else {
        bail!("{}: {}", failure_prefix, result.message())
    }
}

fn report_batch(report: &BatchReport, verb: &str) -> Result<()> {
    if report.all_succeeded() {
        println!("{} {} rows {}", "OK".green().bold(), report.len(), verb);
        return Ok(());
    }
    println!(
        "{} {} of {} rows {}",
        "PARTIAL".red().bold(),
        report.success_count(),
        report.len(),
        verb
    );
    for failure in report.failures() {
        println!(
            "  row {}: {}",
            failure.row_number.to_string().yellow(),
            failure.result.message()
        );
    }
    bail!(
        "{} of {} rows failed",
        report.len() - report.success_count(),
        report.len()
    )
}

fn format_rows(rows: &RowSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&rows.to_json_rows())
                .context("Failed to format JSON output")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::JsonCompact => {
            let mut out = serde_json::to_string(&rows.to_json_rows())
                .context("Failed to format JSON output")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Csv => rows_to_csv(rows),
    }
}

fn rows_to_csv(rows: &RowSet) -> Result<String> {
    let columns = rows.columns();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&columns)
        .context("Failed to write CSV header")?;
    for row in rows.rows() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| display_value(row.get(column).unwrap_or(&Value::Null)))
            .collect();
        writer
            .write_record(&record)
            .context("Failed to write CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
