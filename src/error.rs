use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;
#[cfg(feature = "postgres")]
use tokio_postgres;

#[derive(Debug, Error)]
pub enum SqlBridgeError {
    /// The statement text was rejected by the engine's prepare step.
    ///
    /// This is the only failure `exec`/`query` report through `Err`; runtime failures of a
    /// well-formed statement come back as a failed outcome instead.
    #[error("Invalid SQL statement in database '{database}': {sql}")]
    InvalidStatement { database: String, sql: String },

    #[error("Parameterized call requires at least one argument")]
    NoArguments,

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlBridgeError {
    pub(crate) fn invalid_statement(database: &str, sql: &str) -> Self {
        SqlBridgeError::InvalidStatement {
            database: database.to_string(),
            sql: sql.to_string(),
        }
    }
}
