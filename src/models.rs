use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A table row as returned by the store: every column, keyed by name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// One translation bundle for a `(project_id, locale)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationRecord {
    pub project_id: String,
    pub locale: String,
    pub localizations: serde_json::Map<String, serde_json::Value>,
}

impl LocalizationRecord {
    /// Convert into a generic store row
    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        row.insert("project_id".to_string(), self.project_id.into());
        row.insert("locale".to_string(), self.locale.into());
        row.insert(
            "localizations".to_string(),
            serde_json::Value::Object(self.localizations),
        );
        row
    }
}

/// Placeholder payload served by `GET /api/localizations/{project_id}/{locale}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationBundle {
    pub project_id: String,
    pub locale: String,
    pub localizations: BTreeMap<String, String>,
}

impl LocalizationBundle {
    /// The fixed bundle; it never consults the store
    pub fn placeholder(project_id: String, locale: String) -> Self {
        let localizations = BTreeMap::from([
            ("greeting".to_string(), "Hello".to_string()),
            ("farewell".to_string(), "Goodbye".to_string()),
        ]);
        Self {
            project_id,
            locale,
            localizations,
        }
    }
}

/// Body of store-backed read responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsEnvelope {
    pub data: Vec<Row>,
    pub count: Option<u64>,
}

impl From<Vec<Row>> for RowsEnvelope {
    fn from(data: Vec<Row>) -> Self {
        Self { data, count: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationUpdate {
    pub project_id: String,
    pub locale: String,
    /// Replacement key/value map; overwrites the stored one entirely
    pub localizations: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub updates: Vec<LocalizationUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub updated_count: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}
