use crate::error::{ApiError, StoreError};
use crate::models::{BulkUpdateResponse, LocalizationUpdate, Row};
use crate::query::{QueryResponse, Table};
use crate::store::Store;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Split a comma-separated id list: tokens are trimmed, blanks dropped,
/// order and duplicates kept
pub fn parse_project_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and bulk-update operations over the localizations table
pub struct LocalizationService {
    store: Arc<dyn Store>,
    table: Table,
}

impl LocalizationService {
    pub fn new(store: Arc<dyn Store>, table_name: &str) -> Result<Self, StoreError> {
        Ok(Self {
            store,
            table: Table::new(table_name)?,
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Row>, StoreError> {
        let response = self.table.select().execute(self.store.as_ref()).await?;
        Ok(response.into_rows())
    }

    /// Rows for one project; no match is `ApiError::NotFound`
    pub async fn find_by_project_id(&self, project_id: &str) -> Result<Vec<Row>, ApiError> {
        let rows = self
            .table
            .select()
            .eq("project_id", project_id)
            .execute(self.store.as_ref())
            .await?
            .into_rows();

        if rows.is_empty() {
            return Err(ApiError::NotFound("Localization not found"));
        }
        Ok(rows)
    }

    /// Rows whose project id is in `project_ids`; an empty list matches nothing
    pub async fn find_by_project_ids(&self, project_ids: Vec<String>) -> Result<Vec<Row>, StoreError> {
        let response = self
            .table
            .select()
            .in_("project_id", project_ids)
            .execute(self.store.as_ref())
            .await?;
        Ok(response.into_rows())
    }

    /// Apply each update in order. A failed item is recorded in `errors` and
    /// never stops the remaining ones.
    pub async fn bulk_update(&self, updates: Vec<LocalizationUpdate>) -> BulkUpdateResponse {
        let attempted = updates.len();
        let mut updated_count = 0;
        let mut errors = Vec::new();

        for LocalizationUpdate {
            project_id,
            locale,
            localizations,
        } in updates
        {
            let mut patch = Row::new();
            patch.insert("localizations".to_string(), Value::Object(localizations));

            let result = self
                .table
                .update(patch)
                .eq("project_id", project_id.as_str())
                .eq("locale", locale.as_str())
                .execute(self.store.as_ref())
                .await;

            let error = match result {
                Ok(QueryResponse { data: Some(rows) }) if !rows.is_empty() => {
                    updated_count += 1;
                    continue;
                }
                Ok(QueryResponse { data: Some(_) }) => format!(
                    "No record found for project {}, locale {}",
                    project_id, locale
                ),
                Ok(QueryResponse { data: None }) => format!(
                    "Failed to update localizations for project {}, locale {}",
                    project_id, locale
                ),
                Err(e) => format!(
                    "Error updating project {}, locale {}: {}",
                    project_id, locale, e
                ),
            };

            warn!("{}", error);
            errors.push(error);
        }

        info!(
            "Bulk update finished: {} attempted, {} updated, {} failed",
            attempted,
            updated_count,
            errors.len()
        );

        BulkUpdateResponse {
            success: errors.is_empty(),
            updated_count,
            errors,
        }
    }
}
