//! Path-segment encoding for primary key values
//!
//! Datasette identifies a row by its primary key values embedded in the URL
//! path, with multiple values joined by commas. Values are escaped with the
//! service's tilde scheme so that a literal comma (or any other
//! path-significant character) inside a value survives the round trip.

use anyhow::{Result, bail};
use serde_json::Value;

/// Escape a primary key value with Datasette's tilde scheme:
/// `~` -> `~~`, `/` -> `~s`, `,` -> `~c`, `?` -> `~q`, `#` -> `~h`.
pub fn tilde_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '~' => out.push_str("~~"),
            '/' => out.push_str("~s"),
            ',' => out.push_str("~c"),
            '?' => out.push_str("~q"),
            '#' => out.push_str("~h"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`tilde_encode`]. Fails on a dangling or unknown escape.
pub fn tilde_decode(encoded: &str) -> Result<String> {
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('~') => out.push('~'),
            Some('s') => out.push('/'),
            Some('c') => out.push(','),
            Some('q') => out.push('?'),
            Some('h') => out.push('#'),
            Some(other) => bail!("unknown escape '~{}' in '{}'", other, encoded),
            None => bail!("dangling '~' at end of '{}'", encoded),
        }
    }
    Ok(out)
}

/// Render a scalar primary key value to the text form used in row paths.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Build the path segment identifying one row: each primary key value
/// tilde-encoded, then joined with literal commas.
pub fn row_path(pk_values: &[Value]) -> String {
    pk_values
        .iter()
        .map(|v| tilde_encode(&scalar_to_string(v)))
        .collect::<Vec<_>>()
        .join(",")
}
