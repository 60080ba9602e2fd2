use std::future::Future;

use tokio::runtime::{Builder, Runtime};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use crate::database::Database;
use crate::error::SqlBridgeError;
use crate::lifecycle::{ConnectionState, Lifecycle};
use crate::outcome::{ExecOutcome, QueryOutcome};
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{Args, Validation};

use super::config::PostgresOptions;
use super::params::Params;
use super::query::{
    build_result_set_from_rows, build_result_set_from_simple, is_projectable, last_command_count,
    text_projection,
};

const COUNT_USER_TABLES: &str = "SELECT count(*) FROM information_schema.tables \
     WHERE table_schema NOT IN ('pg_catalog', 'information_schema')";

// `lastval()` runs in the block's own subtransaction, so its "not yet defined" error never
// reaches an open transaction of the caller.
const STORE_LAST_INSERTION: &str = "DO $$ BEGIN \
     PERFORM set_config('sql_bridge.last_insertion', lastval()::text, false); \
     EXCEPTION WHEN object_not_in_prerequisite_state THEN \
     PERFORM set_config('sql_bridge.last_insertion', '0', false); \
     END $$; \
     SELECT current_setting('sql_bridge.last_insertion')";

/// SQLSTATE class 42 (syntax error or access rule violation) covers malformed text and
/// references to missing tables, columns, functions and types.
fn is_malformed(code: Option<&SqlState>) -> bool {
    code.is_some_and(|code| code.code().starts_with("42"))
}

/// A client plus the runtime that drives its connection task.
///
/// Field order matters: the client drops first, then the runtime cancels the connection task.
struct PgHandle {
    client: Client,
    runtime: Runtime,
}

impl PgHandle {
    fn connect(options: &PostgresOptions) -> Result<Self, SqlBridgeError> {
        options.validate()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqlBridgeError::ConnectionError(format!("runtime: {e}")))?;

        let name = options.display_name();
        let (client, connection) = runtime.block_on(options.to_pg_config().connect(NoTls))?;
        runtime.spawn(async move {
            if let Err(err) = connection.await {
                tracing::warn!(database = %name, error = %err, "postgres connection task ended");
            }
        });

        Ok(Self { client, runtime })
    }

    fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

/// Adapter over one `tokio-postgres` client, driven synchronously.
///
/// Each adapter owns a current-thread runtime, so its methods must not be called from inside
/// another async runtime. Parameterized SQL may use `?` or `?N` markers; they are rewritten to
/// `$N` before prepare.
pub struct PostgresDatabase {
    conn: Lifecycle<PgHandle>,
}

impl PostgresDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            conn: Lifecycle::new(),
        }
    }

    /// Connect with `options`. Does nothing unless the adapter is still unopened; check
    /// [`Database::good`] for the result.
    pub fn open(&mut self, options: &PostgresOptions) {
        self.conn
            .open_with(options.display_name(), || PgHandle::connect(options));
    }

    /// Split a prepare error: malformed text is raised, anything else (aborted transaction,
    /// lost connection) comes back as the message for a `Failed` outcome.
    fn reject(&self, sql: &str, err: &tokio_postgres::Error) -> Result<String, SqlBridgeError> {
        if is_malformed(err.code()) {
            tracing::debug!(database = %self.conn.name(), error = %err, "statement rejected");
            Err(SqlBridgeError::invalid_statement(self.conn.name(), sql))
        } else {
            tracing::debug!(database = %self.conn.name(), error = %err, "postgres prepare failed");
            Ok(err.to_string())
        }
    }
}

impl Default for PostgresDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for PostgresDatabase {
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
        PlaceholderStyle::Postgres
    }

    fn close(&mut self) {
        drop(self.conn.close());
    }

    /// True when no table exists outside the system schemas. `false` when not open.
    fn empty(&self) -> bool {
        let Some(handle) = self.conn.handle() else {
            return false;
        };
        match handle.block_on(handle.client.query_one(COUNT_USER_TABLES, &[])) {
            Ok(row) => row.try_get::<_, i64>(0).is_ok_and(|n| n == 0),
            Err(err) => {
                tracing::warn!(database = %self.conn.name(), error = %err, "table count failed");
                false
            }
        }
    }

    fn validate(&self, sql: &str) -> bool {
        self.conn
            .handle()
            .is_some_and(|handle| handle.block_on(handle.client.prepare(sql)).is_ok())
    }

    fn exec_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<ExecOutcome, SqlBridgeError> {
        let Some(handle) = self.conn.handle() else {
            return Ok(ExecOutcome::NotReady);
        };
        if validation.enabled()
            && let Err(err) = handle.block_on(handle.client.prepare(sql))
        {
            return self.reject(sql, &err).map(ExecOutcome::failed);
        }

        Ok(match handle.block_on(handle.client.simple_query(sql)) {
            Ok(messages) => ExecOutcome::Done {
                rows_affected: last_command_count(&messages),
            },
            Err(err) => {
                tracing::debug!(database = %self.conn.name(), error = %err, "postgres exec failed");
                ExecOutcome::failed(err)
            }
        })
    }

    fn query_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<QueryOutcome, SqlBridgeError> {
        let Some(handle) = self.conn.handle() else {
            return Ok(QueryOutcome::NotReady);
        };
        if validation.enabled()
            && let Err(err) = handle.block_on(handle.client.prepare(sql))
        {
            return self.reject(sql, &err).map(QueryOutcome::failed);
        }

        Ok(match handle.block_on(handle.client.simple_query(sql)) {
            Ok(messages) => QueryOutcome::Rows(build_result_set_from_simple(&messages)),
            Err(err) => {
                tracing::debug!(database = %self.conn.name(), error = %err, "postgres query failed");
                QueryOutcome::failed(err)
            }
        })
    }

    fn exec_params(&mut self, sql: &str, args: &Args) -> Result<ExecOutcome, SqlBridgeError> {
        let Some(handle) = self.conn.handle() else {
            return Ok(ExecOutcome::NotReady);
        };
        let sql = translate_placeholders(sql, PlaceholderStyle::Postgres);
        let stmt = match handle.block_on(handle.client.prepare(&sql)) {
            Ok(stmt) => stmt,
            Err(err) => return self.reject(&sql, &err).map(ExecOutcome::failed),
        };

        let params = Params::convert(args);
        Ok(
            match handle.block_on(handle.client.execute(&stmt, params.as_refs())) {
                Ok(rows_affected) => ExecOutcome::Done { rows_affected },
                Err(err) => {
                    tracing::debug!(
                        database = %self.conn.name(),
                        args = args.len(),
                        error = %err,
                        "postgres parameterized exec failed"
                    );
                    ExecOutcome::failed(err)
                }
            },
        )
    }

    fn query_params(&mut self, sql: &str, args: &Args) -> Result<QueryOutcome, SqlBridgeError> {
        let Some(handle) = self.conn.handle() else {
            return Ok(QueryOutcome::NotReady);
        };
        let sql = translate_placeholders(sql, PlaceholderStyle::Postgres);
        let stmt = match handle.block_on(handle.client.prepare(&sql)) {
            Ok(stmt) => stmt,
            Err(err) => return self.reject(&sql, &err).map(QueryOutcome::failed),
        };

        // Rows are fetched through the text projection so values read exactly as on the simple
        // path. Statements that cannot sit inside a WITH (EXPLAIN, SHOW, data-modifying WITH)
        // run as prepared and are decoded client-side.
        let projected = if stmt.columns().is_empty() || !is_projectable(&sql) {
            None
        } else {
            let text_sql = text_projection(&sql, stmt.columns().len());
            match handle.block_on(handle.client.prepare_typed(&text_sql, stmt.params())) {
                Ok(text_stmt) => Some(text_stmt),
                Err(err) => {
                    tracing::debug!(
                        database = %self.conn.name(),
                        error = %err,
                        "text projection unavailable, decoding binary rows"
                    );
                    None
                }
            }
        };

        let params = Params::convert(args);
        let run = handle
            .block_on(
                handle
                    .client
                    .query(projected.as_ref().unwrap_or(&stmt), params.as_refs()),
            )
            .map_err(SqlBridgeError::from)
            .and_then(|rows| build_result_set_from_rows(stmt.columns(), &rows));
        Ok(match run {
            Ok(result_set) => QueryOutcome::Rows(result_set),
            Err(err) => {
                tracing::debug!(
                    database = %self.conn.name(),
                    args = args.len(),
                    error = %err,
                    "postgres parameterized query failed"
                );
                QueryOutcome::failed(err)
            }
        })
    }

    /// `lastval()` of this session, `0` before any sequence was used here. Safe to call inside
    /// an open transaction.
    fn get_last_insertion(&self) -> i64 {
        let Some(handle) = self.conn.handle() else {
            return -1;
        };
        match handle.block_on(handle.client.simple_query(STORE_LAST_INSERTION)) {
            Ok(messages) => messages
                .iter()
                .find_map(|message| match message {
                    SimpleQueryMessage::Row(row) => row.get(0).and_then(|v| v.parse().ok()),
                    _ => None,
                })
                .unwrap_or(0),
            Err(err) => {
                tracing::debug!(database = %self.conn.name(), error = %err, "no last insertion id");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_and_missing_objects_are_malformed() {
        assert!(is_malformed(Some(&SqlState::SYNTAX_ERROR)));
        assert!(is_malformed(Some(&SqlState::UNDEFINED_TABLE)));
        assert!(is_malformed(Some(&SqlState::UNDEFINED_COLUMN)));
        assert!(is_malformed(Some(&SqlState::UNDEFINED_FUNCTION)));
    }

    #[test]
    fn engine_state_errors_are_not_malformed() {
        assert!(!is_malformed(Some(&SqlState::IN_FAILED_SQL_TRANSACTION)));
        assert!(!is_malformed(Some(&SqlState::ADMIN_SHUTDOWN)));
        assert!(!is_malformed(Some(&SqlState::LOCK_NOT_AVAILABLE)));
        assert!(!is_malformed(None));
    }
}
