use super::Store;
use crate::error::StoreError;
use crate::models::Row;
use crate::query::{Filter, Operation, Query, QueryResponse};
use crate::retry::{with_retry_if, RetryConfig};
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

/// Hosted store reached through its REST interface (`{base_url}/rest/v1/{table}`)
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: reqwest::Client,
    rest_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            retry: RetryConfig::store_request(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn send(&self, query: &Query) -> Result<QueryResponse, StoreError> {
        let url = self.table_url(&query.table);
        let mut params = filter_params(&query.filters);

        let request = match &query.operation {
            Operation::Select => {
                params.insert(0, ("select".to_string(), "*".to_string()));
                self.client.get(&url)
            }
            Operation::Update(patch) => self
                .client
                .patch(&url)
                .header("Prefer", "return=representation")
                .json(patch),
        };

        let response = request
            .query(&params)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_rows(&body)
    }
}

impl Store for PostgrestStore {
    fn execute(&self, query: Query) -> BoxFuture<'_, Result<QueryResponse, StoreError>> {
        Box::pin(async move {
            let operation_name = match &query.operation {
                Operation::Select => format!("select from {}", query.table),
                Operation::Update(_) => format!("update {}", query.table),
            };
            debug!("{} ({} filters)", operation_name, query.filters.len());

            with_retry_if(
                &self.retry,
                &operation_name,
                || self.send(&query),
                StoreError::is_transient,
            )
            .await
        })
    }
}

/// Translate filters into REST query parameters (`col=eq.v`, `col=in.("a","b")`)
fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
            Filter::In { column, values } => {
                let list = values
                    .iter()
                    .map(|v| quote_value(v))
                    .collect::<Vec<_>>()
                    .join(",");
                (column.clone(), format!("in.({})", list))
            }
        })
        .collect()
}

/// Double-quote a list element so commas and parentheses stay literal
fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Empty or `null` bodies carry no row set
fn parse_rows(body: &str) -> Result<QueryResponse, StoreError> {
    if body.trim().is_empty() {
        return Ok(QueryResponse { data: None });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;

    match value {
        Value::Null => Ok(QueryResponse { data: None }),
        Value::Array(items) => {
            let rows = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(StoreError::Decode(format!(
                        "expected row object, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<Row>, _>>()?;
            Ok(QueryResponse::rows(rows))
        }
        other => Err(StoreError::Decode(format!(
            "expected array of rows, got {}",
            other
        ))),
    }
}
