use anyhow::{Context, Result};
use std::str::FromStr;

/// Which store implementation serves the `localizations` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Hosted database reached over its REST interface
    Supabase,
    /// Direct Postgres connection
    Postgres,
    /// In-process table, for local development
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" | "rest" => Ok(Self::Supabase),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!(
                "Unknown STORE_BACKEND '{}'. Expected supabase, postgres or memory",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,

    // Hosted store (REST)
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub store_max_attempts: u32,

    // Direct Postgres
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Memory store
    pub memory_seed_path: Option<String>,

    pub localizations_table: String,

    // Server
    pub host: String,
    pub port: u16,
    /// Bulk-update body cap in bytes; `None` means unlimited
    pub max_body_bytes: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "supabase".to_string())
            .parse()?;

        let supabase_url = non_empty_var("SUPABASE_URL");
        let supabase_key = non_empty_var("SUPABASE_KEY");
        let database_url = non_empty_var("DATABASE_URL");

        match store_backend {
            StoreBackend::Supabase => {
                supabase_url.as_ref().context("SUPABASE_URL not set")?;
                supabase_key.as_ref().context("SUPABASE_KEY not set")?;
            }
            StoreBackend::Postgres => {
                database_url.as_ref().context("DATABASE_URL not set")?;
            }
            StoreBackend::Memory => {}
        }

        let store_max_attempts = std::env::var("STORE_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        if store_max_attempts == 0 {
            anyhow::bail!("STORE_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            store_backend,
            supabase_url: supabase_url.map(|url| url.trim_end_matches('/').to_string()),
            supabase_key,
            store_max_attempts,
            database_url,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            memory_seed_path: non_empty_var("MEMORY_SEED_PATH"),
            localizations_table: std::env::var("LOCALIZATIONS_TABLE")
                .unwrap_or_else(|_| "localizations".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|limit: &usize| *limit > 0),
        })
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
