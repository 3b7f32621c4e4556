//! HTTP client for the Datasette JSON API
//!
//! Each method issues a single request and returns either typed data (read
//! endpoints, via `anyhow::Result`) or a normalized [`CallResult`] envelope
//! (write endpoints, which never propagate a transport failure). No retries,
//! no cross-call state beyond the immutable connection config.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value, json};

use super::config::ConnectionConfig;
use super::encoding::row_path;
use super::models::{CallResult, Column, ResponseBody, parse_schema};
use crate::load::RowSet;

/// Bounded default so a dead endpoint cannot hang a command indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Datasette instance.
///
/// Stateless beyond the connection config and the HTTP connection pool;
/// safe to share between sequential calls.
pub struct DatasetteClient {
    config: ConnectionConfig,
    http: reqwest::Client,
}

impl DatasetteClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.authorization_header() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    /// GET a JSON endpoint, failing with context on transport errors,
    /// non-success statuses and malformed bodies.
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .with_auth(self.http.get(url.as_str()))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned HTTP {}: {}", url, status.as_u16(), text);
        }
        response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))
    }

    /// POST a JSON body and normalize the outcome. Transport failures are
    /// caught here and become `{success: false, error}` results.
    async fn post_json(&self, path: &str, body: &Value, accept_created: bool) -> CallResult {
        let url = self.url(path);
        debug!("POST {}", url);
        let request = self.with_auth(self.http.post(url.as_str())).json(body);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return CallResult::error(format!("request to {} failed: {}", url, e)),
        };
        let status = response.status();
        let body = match read_body(response).await {
            Ok(body) => body,
            Err(e) => {
                return CallResult::error(format!("failed to read response from {}: {}", url, e));
            }
        };
        let success =
            status == StatusCode::OK || (accept_created && status == StatusCode::CREATED);
        if success {
            CallResult::success(status.as_u16(), body)
        } else {
            CallResult::failure(status.as_u16(), body)
        }
    }

    /// List database names exposed by the instance, in the order the
    /// service reports them.
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        let data = self
            .get_json("/.json")
            .await
            .context("Failed to fetch databases")?;
        let databases = data
            .get("databases")
            .and_then(Value::as_object)
            .ok_or_else(|| anyhow!("response missing 'databases' map"))?;
        Ok(databases.keys().cloned().collect())
    }

    /// List table names in a database.
    pub async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        let data = self
            .get_json(&format!("/{}.json", database))
            .await
            .with_context(|| format!("Failed to fetch tables for '{}'", database))?;
        let tables = data
            .get("tables")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("response missing 'tables' list"))?;
        Ok(tables
            .iter()
            .filter_map(|table| table.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Fetch the schema of a table as a list of column descriptors.
    pub async fn table_schema(&self, database: &str, table: &str) -> Result<Vec<Column>> {
        let data = self
            .get_json(&format!("/{}/{}.json", database, table))
            .await
            .with_context(|| format!("Failed to fetch schema for '{}/{}'", database, table))?;
        parse_schema(&data)
    }

    /// Fetch every row of a table.
    pub async fn all_rows(&self, database: &str, table: &str) -> Result<RowSet> {
        let data = self
            .get_json(&format!("/{}/{}.json?_shape=array", database, table))
            .await
            .with_context(|| format!("Failed to fetch rows for '{}/{}'", database, table))?;
        RowSet::from_json_rows(&data)
    }

    /// Create a new table populated with the given rows.
    pub async fn create_table(&self, database: &str, table: &str, rows: &RowSet) -> CallResult {
        let payload = json!({ "table": table, "rows": rows.to_json_rows() });
        self.post_json(&format!("/{}/-/create", database), &payload, true)
            .await
    }

    /// Insert rows into an existing table.
    pub async fn insert_rows(&self, database: &str, table: &str, rows: &RowSet) -> CallResult {
        let payload = json!({ "rows": rows.to_json_rows() });
        self.post_json(&format!("/{}/{}/-/insert", database, table), &payload, true)
            .await
    }

    /// Drop a table. The service only proceeds when `confirm` is set; an
    /// unconfirmed call sends an empty body and the service answers with
    /// what confirmation would do.
    pub async fn drop_table(&self, database: &str, table: &str, confirm: bool) -> CallResult {
        let payload = if confirm {
            json!({ "confirm": true })
        } else {
            json!({})
        };
        self.post_json(&format!("/{}/{}/-/drop", database, table), &payload, false)
            .await
    }

    /// Update a single row identified by its primary key values, asking the
    /// service to return the updated row.
    pub async fn update_row(
        &self,
        database: &str,
        table: &str,
        pk_values: &[Value],
        updates: &Map<String, Value>,
    ) -> CallResult {
        let payload = json!({ "update": updates, "return": true });
        let path = format!("/{}/{}/{}/-/update", database, table, row_path(pk_values));
        self.post_json(&path, &payload, false).await
    }

    /// Delete a single row identified by its primary key values.
    ///
    /// Success requires both a success status and `ok: true` in the
    /// response body; the service reports some delete failures with a 200.
    pub async fn delete_row(&self, database: &str, table: &str, pk_values: &[Value]) -> CallResult {
        let path = format!("/{}/{}/{}/-/delete", database, table, row_path(pk_values));
        let mut result = self.post_json(&path, &json!({}), false).await;
        if result.success {
            if let Some(ResponseBody::Json(body)) = &result.body {
                if body.get("ok").and_then(Value::as_bool) == Some(false) {
                    result.success = false;
                    result.error = body
                        .get("error")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .or_else(|| Some("service reported ok: false".to_string()));
                }
            }
        }
        result
    }
}

/// Read a response body as JSON or raw text depending on the declared
/// content type. An empty body yields `None`.
async fn read_body(response: Response) -> Result<Option<ResponseBody>> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("json"))
        .unwrap_or(false);
    if is_json {
        let value = response.json().await?;
        Ok(Some(ResponseBody::Json(value)))
    } else {
        let text = response.text().await?;
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ResponseBody::Text(text)))
        }
    }
}
