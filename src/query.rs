//! Store-agnostic table queries.
//!
//! Handlers describe what they want with a small fluent builder:
//!
//! ```ignore
//! table.select().eq("project_id", "web").execute(store).await?;
//! table.update(patch).eq("project_id", "web").eq("locale", "en").execute(store).await?;
//! ```
//!
//! Backends in [`crate::store`] translate the resulting [`Query`] into their
//! own vocabulary (REST filters, SQL).

use crate::error::StoreError;
use crate::models::Row;
use crate::store::Store;

/// Row filter applied by select and update queries
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// `column IN (values)`; an empty list matches nothing
    In { column: String, values: Vec<String> },
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// Evaluate the filter against an in-memory row.
    ///
    /// Non-string column values are compared by their JSON text, so a numeric
    /// `42` matches the filter value `"42"`.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(cell) = row.get(self.column()).and_then(cell_text) else {
            return false;
        };
        match self {
            Filter::Eq { value, .. } => cell == *value,
            Filter::In { values, .. } => values.iter().any(|v| *v == cell),
        }
    }
}

fn cell_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Return every column of the matching rows
    Select,
    /// Overwrite the given columns on every matching row
    Update(Row),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub operation: Operation,
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn in_<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// True if every filter accepts the row
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    pub async fn execute(self, store: &dyn Store) -> Result<QueryResponse, StoreError> {
        store.execute(self).await
    }
}

/// Outcome of an executed query.
///
/// `data` holds the matching rows for a select and the affected rows for an
/// update. `None` means the store answered without a row set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    pub data: Option<Vec<Row>>,
}

impl QueryResponse {
    pub fn rows(rows: Vec<Row>) -> Self {
        Self { data: Some(rows) }
    }

    /// Rows, treating an absent row set as empty
    pub fn into_rows(self) -> Vec<Row> {
        self.data.unwrap_or_default()
    }
}

/// Entry point of the builder, bound to one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
}

impl Table {
    pub fn new(name: &str) -> Result<Self, StoreError> {
        validate_identifier(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select(&self) -> Query {
        self.query(Operation::Select)
    }

    pub fn update(&self, patch: Row) -> Query {
        self.query(Operation::Update(patch))
    }

    fn query(&self, operation: Operation) -> Query {
        Query {
            table: self.name.clone(),
            operation,
            filters: Vec::new(),
        }
    }
}

/// Accept plain SQL identifiers only: `[A-Za-z_][A-Za-z0-9_]*`
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_select_builder_collects_filters_in_order() {
        let table = Table::new("localizations").unwrap();
        let query = table
            .select()
            .eq("project_id", "web")
            .in_("locale", ["en", "fr"]);

        assert_eq!(query.table, "localizations");
        assert_eq!(query.operation, Operation::Select);
        assert_eq!(
            query.filters,
            vec![
                Filter::Eq {
                    column: "project_id".to_string(),
                    value: "web".to_string()
                },
                Filter::In {
                    column: "locale".to_string(),
                    values: vec!["en".to_string(), "fr".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_update_builder_keeps_patch() {
        let table = Table::new("localizations").unwrap();
        let patch = row(json!({"localizations": {"hi": "Hello"}}));
        let query = table.update(patch.clone()).eq("locale", "en");

        assert_eq!(query.operation, Operation::Update(patch));
        assert_eq!(query.filters.len(), 1);
    }

    #[test]
    fn test_eq_filter_matches() {
        let r = row(json!({"project_id": "web", "locale": "en", "version": 3}));

        assert!(Filter::Eq {
            column: "project_id".to_string(),
            value: "web".to_string()
        }
        .matches(&r));
        assert!(Filter::Eq {
            column: "version".to_string(),
            value: "3".to_string()
        }
        .matches(&r));
        assert!(!Filter::Eq {
            column: "project_id".to_string(),
            value: "mobile".to_string()
        }
        .matches(&r));
        assert!(!Filter::Eq {
            column: "missing".to_string(),
            value: "web".to_string()
        }
        .matches(&r));
    }

    #[test]
    fn test_in_filter_with_empty_list_matches_nothing() {
        let r = row(json!({"project_id": "web"}));
        let filter = Filter::In {
            column: "project_id".to_string(),
            values: vec![],
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_null_cell_never_matches() {
        let r = row(json!({"project_id": null}));
        let filter = Filter::Eq {
            column: "project_id".to_string(),
            value: "null".to_string(),
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_query_matches_requires_all_filters() {
        let table = Table::new("localizations").unwrap();
        let query = table.select().eq("project_id", "web").eq("locale", "fr");

        assert!(query.matches(&row(json!({"project_id": "web", "locale": "fr"}))));
        assert!(!query.matches(&row(json!({"project_id": "web", "locale": "en"}))));
        assert!(table.select().matches(&row(json!({}))));
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("localizations").is_ok());
        assert!(validate_identifier("_bundles_v2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2fa").is_err());
        assert!(validate_identifier("drop table").is_err());
        assert!(validate_identifier("a\"b").is_err());
        assert!(Table::new("public.localizations").is_err());
    }

    #[test]
    fn test_query_response_into_rows() {
        assert!(QueryResponse::default().into_rows().is_empty());
        let rows = vec![row(json!({"a": 1}))];
        assert_eq!(QueryResponse::rows(rows.clone()).into_rows(), rows);
    }
}
