use super::Store;
use crate::error::StoreError;
use crate::models::Row;
use crate::query::{validate_identifier, Filter, Operation, Query, QueryResponse};
use futures::future::BoxFuture;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

/// Direct Postgres connection. Rows come back as `to_jsonb(row)` so every
/// column is returned without a fixed schema.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    async fn run(&self, query: Query) -> Result<QueryResponse, StoreError> {
        let mut builder = build_sql(&query)?;
        let rows = builder
            .build_query_scalar::<Json<Row>>()
            .fetch_all(&self.pool)
            .await?;
        Ok(QueryResponse::rows(
            rows.into_iter().map(|Json(row)| row).collect(),
        ))
    }
}

impl Store for PostgresStore {
    fn execute(&self, query: Query) -> BoxFuture<'_, Result<QueryResponse, StoreError>> {
        Box::pin(self.run(query))
    }
}

fn quote_identifier(name: &str) -> Result<String, StoreError> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name))
}

/// Build the SQL for a query. Values are always bound; identifiers are
/// validated and quoted.
///
/// Updated columns go through `jsonb_populate_record` so each JSON value is
/// cast to the column's declared type.
pub(crate) fn build_sql(query: &Query) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let table = quote_identifier(&query.table)?;

    let mut builder = match &query.operation {
        Operation::Select => QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {} AS t", table)),
        Operation::Update(patch) => {
            if patch.is_empty() {
                return Err(StoreError::InvalidQuery("update without columns".to_string()));
            }
            let mut builder = QueryBuilder::new(format!("UPDATE {} AS t SET ", table));
            for (i, column) in patch.keys().enumerate() {
                let column = quote_identifier(column)?;
                if i > 0 {
                    builder.push(", ");
                }
                builder.push(format!("{} = (jsonb_populate_record(NULL::{}, ", column, table));
                builder.push_bind(Json(patch.clone()));
                builder.push(format!(")).{}", column));
            }
            builder
        }
    };

    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        let column = quote_identifier(filter.column())?;
        match filter {
            Filter::Eq { value, .. } => {
                builder.push(format!("t.{}::text = ", column));
                builder.push_bind(value.clone());
            }
            Filter::In { values, .. } => {
                builder.push(format!("t.{}::text = ANY(", column));
                builder.push_bind(values.clone());
                builder.push(")");
            }
        }
    }

    if matches!(query.operation, Operation::Update(_)) {
        builder.push(" RETURNING to_jsonb(t)");
    }

    Ok(builder)
}
