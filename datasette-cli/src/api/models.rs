//! Response envelope and schema shapes for the Datasette API

use anyhow::{Result, anyhow, bail};
use serde_json::Value;

/// Body of an API response, tagged by the declared content type.
///
/// The service answers some endpoints with JSON and others with plain text
/// (notably error pages), so callers must handle both.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => write!(f, "{}", pretty),
                Err(_) => write!(f, "{}", value),
            },
            ResponseBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Uniform outcome of one mutating API call.
///
/// `success == false` with no `error` means the service answered with a
/// non-2xx status; `body` then carries the service's error text or JSON
/// verbatim. A set `error` means the call never produced a usable response
/// (transport failure or local validation).
#[derive(Debug, Clone)]
pub struct CallResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub body: Option<ResponseBody>,
    pub error: Option<String>,
}

impl CallResult {
    /// Successful response from the service.
    pub fn success(status_code: u16, body: Option<ResponseBody>) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            body,
            error: None,
        }
    }

    /// Non-success status from the service; the body is preserved verbatim.
    pub fn failure(status_code: u16, body: Option<ResponseBody>) -> Self {
        Self {
            success: false,
            status_code: Some(status_code),
            body,
            error: None,
        }
    }

    /// Failure before any response was available (transport error or local
    /// validation).
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: None,
            body: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Best available message for reporting a failure.
    pub fn message(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        if let Some(body) = &self.body {
            return match self.status_code {
                Some(status) => format!("HTTP {}: {}", status, body),
                None => body.to_string(),
            };
        }
        match self.status_code {
            Some(status) => format!("HTTP {}", status),
            None => "unknown error".to_string(),
        }
    }
}

/// One column of a table schema. The service returns either a plain name or
/// a richer descriptor; everything beyond the name is kept as raw JSON.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub details: Value,
}

/// Parse a table schema response.
///
/// Accepts both observed shapes: a `columns` list (strings, or objects with
/// a `name` field) and a schema-query `rows` list of objects.
pub fn parse_schema(body: &Value) -> Result<Vec<Column>> {
    if let Some(columns) = body.get("columns").and_then(Value::as_array) {
        return columns.iter().map(column_from_entry).collect();
    }
    if let Some(rows) = body.get("rows").and_then(Value::as_array) {
        return rows.iter().map(column_from_entry).collect();
    }
    bail!("schema response has neither a 'columns' nor a 'rows' list")
}

fn column_from_entry(entry: &Value) -> Result<Column> {
    match entry {
        Value::String(name) => Ok(Column {
            name: name.clone(),
            details: Value::Null,
        }),
        Value::Object(map) => {
            let name = map
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("column entry missing 'name' field: {}", entry))?;
            Ok(Column {
                name: name.to_string(),
                details: entry.clone(),
            })
        }
        other => bail!("unexpected column entry: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_schema_column_names() {
        let body = json!({ "columns": ["id", "name", "age"] });
        let columns = parse_schema(&body).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
    }

    #[test]
    fn test_parse_schema_column_objects() {
        let body = json!({ "columns": [{"name": "id", "type": "integer"}] });
        let columns = parse_schema(&body).unwrap();
        assert_eq!(columns[0].name, "id");
        assert_eq!(
            columns[0].details.get("type").and_then(Value::as_str),
            Some("integer")
        );
    }

    #[test]
    fn test_parse_schema_row_list_form() {
        let body = json!({ "rows": [{"name": "id", "pk": 1}, {"name": "title", "pk": 0}] });
        let columns = parse_schema(&body).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title"]);
    }

    #[test]
    fn test_parse_schema_rejects_nameless_entries() {
        let body = json!({ "columns": [{"type": "integer"}] });
        assert!(parse_schema(&body).is_err());

        let body = json!({ "neither": [] });
        assert!(parse_schema(&body).is_err());
    }

    #[test]
    fn test_failure_message_includes_status_and_body() {
        let result = CallResult::failure(404, Some(ResponseBody::Text("not found".to_string())));
        assert_eq!(result.message(), "HTTP 404: not found");
        assert!(!result.is_success());
    }

    #[test]
    fn test_error_result_has_no_status() {
        let result = CallResult::error("connection refused");
        assert!(!result.success);
        assert_eq!(result.status_code, None);
        assert_eq!(result.message(), "connection refused");
    }
}
