use std::path::PathBuf;

use log::debug;

use crate::errors::DbError;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Used when `DATABASE_URL` is unset, e.g. for direct (non-pooled) connections.
pub const FALLBACK_DATABASE_URL_VAR: &str = "DIRECT_DATABASE_URL";
pub const SNAPSHOT_PATH_VAR: &str = "SCHEMA_SNAPSHOT_PATH";
pub const GENERATED_SCHEMA_PATH_VAR: &str = "GENERATED_SCHEMA_PATH";
pub const SCHEMA_NAME_VAR: &str = "SCHEMA_NAME";

pub const DEFAULT_SNAPSHOT_PATH: &str = "attached_assets/complete_current_schema.txt";
pub const DEFAULT_GENERATED_SCHEMA_PATH: &str = "generated_schema.ts";
pub const DEFAULT_SCHEMA_NAME: &str = "public";

/// Everything the binaries need, resolved once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: Option<String>,
    pub snapshot_path: PathBuf,
    pub generated_schema_path: PathBuf,
    pub schema_name: String,
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match get(DATABASE_URL_VAR) {
            Some(url) => {
                debug!("Using connection string from {}", DATABASE_URL_VAR);
                Some(url)
            }
            None => get(FALLBACK_DATABASE_URL_VAR).inspect(|_| {
                debug!("Using connection string from {}", FALLBACK_DATABASE_URL_VAR)
            }),
        };

        Self {
            database_url,
            snapshot_path: get(SNAPSHOT_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string())
                .into(),
            generated_schema_path: get(GENERATED_SCHEMA_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_GENERATED_SCHEMA_PATH.to_string())
                .into(),
            schema_name: get(SCHEMA_NAME_VAR).unwrap_or_else(|| DEFAULT_SCHEMA_NAME.to_string()),
        }
    }

    pub fn require_database_url(&self) -> Result<&str, DbError> {
        self.database_url.as_deref().ok_or_else(|| {
            DbError::Config(format!(
                "neither {} nor {} is set in the environment",
                DATABASE_URL_VAR, FALLBACK_DATABASE_URL_VAR
            ))
        })
    }
}
