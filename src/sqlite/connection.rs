use std::path::Path;

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Batch, Connection, ErrorCode};

use crate::database::Database;
use crate::error::SqlBridgeError;
use crate::lifecycle::{ConnectionState, Lifecycle};
use crate::outcome::{ExecOutcome, QueryOutcome};
use crate::results::ResultSet;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{Args, Validation};

use super::config::SqliteOptions;
use super::params::bind_params;
use super::query::{build_result_set, drain_statement};

/// Adapter over a single `rusqlite` connection.
///
/// Parameterized SQL may use `$1`-style markers; they are rewritten to `?` before prepare.
pub struct SqliteDatabase {
    conn: Lifecycle<Connection>,
}

impl SqliteDatabase {
    /// An adapter that has not opened anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            conn: Lifecycle::new(),
        }
    }

    /// Construct and open `db_path` with default options.
    #[must_use]
    pub fn with_path(db_path: impl Into<String>) -> Self {
        let mut db = Self::new();
        db.open(&SqliteOptions::new(db_path));
        db
    }

    /// Open the database file, creating it unless `read_only` is set.
    ///
    /// Does nothing unless the adapter is still unopened. Failure is not returned; check
    /// [`Database::good`].
    pub fn open(&mut self, options: &SqliteOptions) {
        self.conn.open_with(options.db_path.clone(), || {
            let conn = Connection::open_with_flags(&options.db_path, options.open_flags())?;
            if let Some(timeout) = options.busy_timeout {
                conn.busy_timeout(timeout)?;
            }
            Ok::<_, SqlBridgeError>(conn)
        });
    }

    /// Borrow the underlying connection for engine-specific work.
    #[must_use]
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.handle()
    }

    /// Split a prepare error: malformed text is raised, anything else (busy, locked, out of
    /// memory) comes back as the message for a `Failed` outcome.
    fn reject(&self, sql: &str, err: &rusqlite::Error) -> Result<String, SqlBridgeError> {
        if is_malformed(err) {
            tracing::debug!(database = %self.conn.name(), error = %err, "statement rejected");
            Err(SqlBridgeError::invalid_statement(self.conn.name(), sql))
        } else {
            tracing::debug!(database = %self.conn.name(), error = %err, "sqlite prepare failed");
            Ok(err.to_string())
        }
    }
}

/// Compile the first statement of `sql` without running it. Text with no statement at all
/// (empty, whitespace, comments) compiles to nothing and passes.
fn prepare_first(conn: &Connection, sql: &str) -> rusqlite::Result<()> {
    Batch::new(conn, sql).next().map(drop)
}

/// Whether a prepare error is about the SQL text rather than the state of the engine.
fn is_malformed(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::NulError(_) | rusqlite::Error::MultipleStatement
    ) || err.sqlite_error_code() == Some(ErrorCode::Unknown)
}

impl Default for SqliteDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for SqliteDatabase {
    fn good(&self) -> bool {
        self.conn.is_ready()
    }

    fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    fn name(&self) -> &str {
        self.conn.name()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Sqlite
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.close()
            && let Err((_conn, err)) = conn.close()
        {
            // the returned handle is dropped here, which finalizes what is left
            tracing::warn!(database = %self.conn.name(), error = %err, "sqlite close reported an error");
        }
    }

    /// True when the backing file is missing or has zero bytes.
    ///
    /// File-level check, independent of the connection state. In-memory databases always count
    /// as empty.
    fn empty(&self) -> bool {
        std::fs::metadata(Path::new(self.conn.name())).map_or(true, |meta| meta.len() == 0)
    }

    fn validate(&self, sql: &str) -> bool {
        self.conn
            .handle()
            .is_some_and(|conn| prepare_first(conn, sql).is_ok())
    }

    fn exec_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<ExecOutcome, SqlBridgeError> {
        let Some(conn) = self.conn.handle() else {
            return Ok(ExecOutcome::NotReady);
        };
        if validation.enabled()
            && let Err(err) = prepare_first(conn, sql)
        {
            return self.reject(sql, &err).map(ExecOutcome::failed);
        }

        match conn.execute_batch(sql) {
            Ok(()) => Ok(ExecOutcome::Done {
                rows_affected: u64::try_from(conn.changes()).unwrap_or(u64::MAX),
            }),
            Err(err) => {
                tracing::debug!(database = %self.conn.name(), error = %err, "sqlite exec failed");
                Ok(ExecOutcome::failed(err))
            }
        }
    }

    fn query_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<QueryOutcome, SqlBridgeError> {
        let Some(conn) = self.conn.handle() else {
            return Ok(QueryOutcome::NotReady);
        };
        if validation.enabled()
            && let Err(err) = prepare_first(conn, sql)
        {
            return self.reject(sql, &err).map(QueryOutcome::failed);
        }

        // each statement is compiled only after the previous one ran, so a script may create a
        // table and then read it
        let run = || -> Result<ResultSet, SqlBridgeError> {
            let mut result_set = ResultSet::with_capacity(10);
            let mut batch = Batch::new(conn, sql);
            while let Some(mut stmt) = batch.next()? {
                build_result_set(conn, &mut stmt, &mut result_set)?;
            }
            Ok(result_set)
        };
        Ok(match run() {
            Ok(result_set) => QueryOutcome::Rows(result_set),
            Err(err) => {
                tracing::debug!(database = %self.conn.name(), error = %err, "sqlite query failed");
                QueryOutcome::failed(err)
            }
        })
    }

    fn exec_params(&mut self, sql: &str, args: &Args) -> Result<ExecOutcome, SqlBridgeError> {
        let Some(conn) = self.conn.handle() else {
            return Ok(ExecOutcome::NotReady);
        };
        let sql = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        let mut stmt = match conn.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(err) => return self.reject(&sql, &err).map(ExecOutcome::failed),
        };

        let run = bind_params(&mut stmt, args).and_then(|()| drain_statement(conn, &mut stmt));
        Ok(match run {
            Ok(rows_affected) => ExecOutcome::Done { rows_affected },
            Err(err) => {
                tracing::debug!(
                    database = %self.conn.name(),
                    args = args.len(),
                    error = %err,
                    "sqlite parameterized exec failed"
                );
                ExecOutcome::failed(err)
            }
        })
    }

    fn query_params(&mut self, sql: &str, args: &Args) -> Result<QueryOutcome, SqlBridgeError> {
        let Some(conn) = self.conn.handle() else {
            return Ok(QueryOutcome::NotReady);
        };
        let sql = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        let mut stmt = match conn.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(err) => return self.reject(&sql, &err).map(QueryOutcome::failed),
        };

        let mut result_set = ResultSet::with_capacity(10);
        let run = bind_params(&mut stmt, args)
            .and_then(|()| build_result_set(conn, &mut stmt, &mut result_set));
        Ok(match run {
            Ok(()) => QueryOutcome::Rows(result_set),
            Err(err) => {
                tracing::debug!(
                    database = %self.conn.name(),
                    args = args.len(),
                    error = %err,
                    "sqlite parameterized query failed"
                );
                QueryOutcome::failed(err)
            }
        })
    }

    fn get_last_insertion(&self) -> i64 {
        self.conn
            .handle()
            .map_or(-1, Connection::last_insert_rowid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_text_errors_are_malformed() {
        let busy = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(5), None);
        let locked = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(6), None);
        let syntax = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some("near \"SELEKT\": syntax error".to_string()),
        );
        assert!(!is_malformed(&busy));
        assert!(!is_malformed(&locked));
        assert!(is_malformed(&syntax));
        assert!(is_malformed(&rusqlite::Error::MultipleStatement));
    }

    #[test]
    fn first_statement_decides() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(prepare_first(&conn, "CREATE TABLE a (x INTEGER); INSERT INTO a VALUES (1)").is_ok());
        assert!(prepare_first(&conn, "  -- nothing here\n").is_ok());
        assert!(prepare_first(&conn, "SELEKT 1; SELECT 1").is_err());
    }
}
