use super::Store;
use crate::error::StoreError;
use crate::models::{LocalizationRecord, Row};
use crate::query::{Operation, Query, QueryResponse};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process tables, keyed by table name.
///
/// Rows keep insertion order. Queries against an unknown table see it empty.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(table: &str, rows: Vec<Row>) -> Self {
        let tables = HashMap::from([(table.to_string(), rows)]);
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    pub fn from_records(table: &str, records: Vec<LocalizationRecord>) -> Self {
        let rows = records
            .into_iter()
            .map(LocalizationRecord::into_row)
            .collect();
        Self::with_rows(table, rows)
    }

    /// Load a JSON array of rows into `table`
    pub async fn from_seed_file(table: &str, path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read seed file {}", path))?;
        let rows: Vec<Row> = serde_json::from_str(&content)
            .context(format!("Seed file {} is not a JSON array of objects", path))?;
        Ok(Self::with_rows(table, rows))
    }

    /// Snapshot of a table's rows
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    async fn run(&self, query: Query) -> QueryResponse {
        match query.operation {
            Operation::Select => {
                let tables = self.tables.read().await;
                let rows = tables
                    .get(&query.table)
                    .map(|rows| {
                        rows.iter()
                            .filter(|row| query.matches(row))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                QueryResponse::rows(rows)
            }
            Operation::Update(ref patch) => {
                let mut tables = self.tables.write().await;
                let mut updated = Vec::new();
                if let Some(rows) = tables.get_mut(&query.table) {
                    for row in rows.iter_mut().filter(|row| query.matches(row)) {
                        for (column, value) in patch {
                            row.insert(column.clone(), value.clone());
                        }
                        updated.push(row.clone());
                    }
                }
                QueryResponse::rows(updated)
            }
        }
    }
}

impl Store for MemoryStore {
    fn execute(&self, query: Query) -> BoxFuture<'_, Result<QueryResponse, StoreError>> {
        Box::pin(async move { Ok(self.run(query).await) })
    }
}
