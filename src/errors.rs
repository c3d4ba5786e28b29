use thiserror::Error;

/// Custom error type for snapshot and catalog operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// Error that occurs during database interactions (e.g., catalog query failure).
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    /// Connection error (e.g., unreachable host or rejected credentials).
    #[error("Connection error: {0}")]
    Connection(String),
    /// Configuration error (e.g., no connection string in the environment).
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The snapshot artifact exists but cannot be read back as a schema.
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl DbError {
    /// Process exit status for this error.
    ///
    /// Local problems (configuration, snapshot file) exit with 2 and
    /// anything coming from the database exits with 3, so neither can be
    /// confused with drift (1).
    pub fn exit_code(&self) -> u8 {
        match self {
            DbError::Config(_) | DbError::NotFound(_) | DbError::Parse(_) | DbError::Io(_) => 2,
            DbError::Sqlx(_) | DbError::Connection(_) => 3,
        }
    }
}
