mod memory;
mod postgres;
mod postgrest;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use postgrest::PostgrestStore;

use crate::config::{Config, StoreBackend};
use crate::error::StoreError;
use crate::query::{Query, QueryResponse};
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::info;

/// Table-oriented query capability the route layer depends on
pub trait Store: Send + Sync {
    fn execute(&self, query: Query) -> BoxFuture<'_, Result<QueryResponse, StoreError>>;
}

/// Build the store selected by `STORE_BACKEND`
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    match config.store_backend {
        StoreBackend::Supabase => {
            let url = config
                .supabase_url
                .as_deref()
                .context("SUPABASE_URL not set")?;
            let key = config
                .supabase_key
                .as_deref()
                .context("SUPABASE_KEY not set")?;
            info!("Using hosted store at {}", url);
            let store = PostgrestStore::new(url, key)
                .with_retry(RetryConfig::store_request_attempts(config.store_max_attempts));
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL not set")?;
            info!("Connecting to Postgres");
            let store = PostgresStore::connect(url, config.database_max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let store = match &config.memory_seed_path {
                Some(path) => {
                    MemoryStore::from_seed_file(&config.localizations_table, path).await?
                }
                None => MemoryStore::new(),
            };
            info!("Using in-memory store");
            Ok(Arc::new(store))
        }
    }
}
