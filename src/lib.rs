pub mod config;
pub mod error;
pub mod localizations;
pub mod models;
pub mod query;
pub mod retry;
pub mod routes;
pub mod store;
