//! One adapter type for code that picks the engine at run time.

use crate::database::Database;
use crate::error::SqlBridgeError;
use crate::lifecycle::ConnectionState;
use crate::outcome::{ExecOutcome, QueryOutcome};
use crate::translation::PlaceholderStyle;
use crate::types::{Args, DatabaseType, Validation};

#[cfg(feature = "postgres")]
use crate::postgres::{PostgresDatabase, PostgresOptions};
#[cfg(feature = "sqlite")]
use crate::sqlite::{SqliteDatabase, SqliteOptions};

/// Open parameters for either engine.
#[derive(Debug, Clone)]
pub enum ConnectOptions {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteOptions),
    #[cfg(feature = "postgres")]
    Postgres(PostgresOptions),
}

impl ConnectOptions {
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "sqlite")]
            ConnectOptions::Sqlite(_) => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            ConnectOptions::Postgres(_) => DatabaseType::Postgres,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<SqliteOptions> for ConnectOptions {
    fn from(opts: SqliteOptions) -> Self {
        ConnectOptions::Sqlite(opts)
    }
}

#[cfg(feature = "postgres")]
impl From<PostgresOptions> for ConnectOptions {
    fn from(opts: PostgresOptions) -> Self {
        ConnectOptions::Postgres(opts)
    }
}

/// Either adapter behind the same [`Database`] contract.
pub enum AnyDatabase {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteDatabase),
    #[cfg(feature = "postgres")]
    Postgres(PostgresDatabase),
}

// Every trait method forwards to whichever adapter is inside.
macro_rules! dispatch {
    ($self:expr, $db:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "sqlite")]
            AnyDatabase::Sqlite($db) => $body,
            #[cfg(feature = "postgres")]
            AnyDatabase::Postgres($db) => $body,
        }
    };
}

impl AnyDatabase {
    /// Open the engine named by `options`. Like the concrete adapters, failure only shows up
    /// as `good() == false`.
    #[must_use]
    pub fn connect(options: impl Into<ConnectOptions>) -> Self {
        match options.into() {
            #[cfg(feature = "sqlite")]
            ConnectOptions::Sqlite(opts) => {
                let mut db = SqliteDatabase::new();
                db.open(&opts);
                AnyDatabase::Sqlite(db)
            }
            #[cfg(feature = "postgres")]
            ConnectOptions::Postgres(opts) => {
                let mut db = PostgresDatabase::new();
                db.open(&opts);
                AnyDatabase::Postgres(db)
            }
        }
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "sqlite")]
            AnyDatabase::Sqlite(_) => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            AnyDatabase::Postgres(_) => DatabaseType::Postgres,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<SqliteDatabase> for AnyDatabase {
    fn from(db: SqliteDatabase) -> Self {
        AnyDatabase::Sqlite(db)
    }
}

#[cfg(feature = "postgres")]
impl From<PostgresDatabase> for AnyDatabase {
    fn from(db: PostgresDatabase) -> Self {
        AnyDatabase::Postgres(db)
    }
}

impl Database for AnyDatabase {
    fn good(&self) -> bool {
        dispatch!(self, db => db.good())
    }

    fn state(&self) -> ConnectionState {
        dispatch!(self, db => db.state())
    }

    fn name(&self) -> &str {
        dispatch!(self, db => db.name())
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        dispatch!(self, db => db.placeholder_style())
    }

    fn close(&mut self) {
        dispatch!(self, db => db.close());
    }

    fn empty(&self) -> bool {
        dispatch!(self, db => db.empty())
    }

    fn validate(&self, sql: &str) -> bool {
        dispatch!(self, db => db.validate(sql))
    }

    fn exec_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<ExecOutcome, SqlBridgeError> {
        dispatch!(self, db => db.exec_with(sql, validation))
    }

    fn query_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<QueryOutcome, SqlBridgeError> {
        dispatch!(self, db => db.query_with(sql, validation))
    }

    fn exec_params(&mut self, sql: &str, args: &Args) -> Result<ExecOutcome, SqlBridgeError> {
        dispatch!(self, db => db.exec_params(sql, args))
    }

    fn query_params(&mut self, sql: &str, args: &Args) -> Result<QueryOutcome, SqlBridgeError> {
        dispatch!(self, db => db.query_params(sql, args))
    }

    fn get_last_insertion(&self) -> i64 {
        dispatch!(self, db => db.get_last_insertion())
    }
}
