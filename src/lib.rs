//! Schema drift detection for a PostgreSQL application database.
//!
//! A snapshot of the live schema is captured into a checked-in text file
//! (`update_schema`) and later compared against the database (`check_schema`).
//! `analyze_schema` reflects the full catalog into a report and Drizzle
//! table definitions.

pub mod analyze;
pub mod check;
pub mod codegen;
pub mod config;
pub mod db;
pub mod diff;
pub mod errors;
pub mod models;
pub mod snapshot;

pub use check::{run_check, CheckOutcome};
pub use config::Config;
pub use db::{capture_live_schema, postgres::PostgresClient, DbClient};
pub use diff::{diff, Discrepancy};
pub use errors::DbError;
pub use models::schema::{Column, Schema, Table};
pub use snapshot::{load_snapshot, write_snapshot};

/// Logger setup shared by the binaries: `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
}

/// Connects using the configured connection string and schema.
pub async fn connect(config: &Config) -> Result<PostgresClient, DbError> {
    let url = config.require_database_url()?;
    let client = PostgresClient::connect(url).await?;
    Ok(client.with_schema(config.schema_name.clone()))
}
