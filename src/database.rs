use crate::error::SqlBridgeError;
use crate::lifecycle::ConnectionState;
use crate::outcome::{ExecOutcome, QueryOutcome};
use crate::translation::PlaceholderStyle;
use crate::types::{Args, Validation};

/// The query contract every adapter implements.
///
/// All calls block until the engine answers. An adapter owns exactly one native connection and
/// is not meant to be shared between threads without external locking; the `&mut self`
/// receivers on the executing methods make that explicit.
///
/// Errors: only text the engine refuses to compile comes back as `Err`
/// ([`SqlBridgeError::InvalidStatement`]). Everything else (runtime failures, a busy or locked
/// database, an aborted transaction, an unopened connection) is reported through the outcome
/// types.
pub trait Database {
    /// Whether the adapter currently holds an open connection.
    fn good(&self) -> bool;

    /// Same query as [`Database::good`].
    fn is_open(&self) -> bool {
        self.good()
    }

    fn state(&self) -> ConnectionState;

    /// Identifying name: a file path or a `user@host:port/db` descriptor.
    fn name(&self) -> &str;

    /// Marker style the engine understands natively.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Release the connection. Idempotent.
    fn close(&mut self);

    /// Engine-specific emptiness check; the definitions differ between adapters.
    fn empty(&self) -> bool;

    /// Prepare `sql` without executing it. `false` when not open or when the engine refuses it.
    fn validate(&self, sql: &str) -> bool;

    /// Run literal SQL (no arguments), optionally validating it first.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::InvalidStatement` when validation is requested and fails.
    fn exec_with(&mut self, sql: &str, validation: Validation)
    -> Result<ExecOutcome, SqlBridgeError>;

    /// [`Database::exec_with`] with validation on.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::InvalidStatement` when validation fails.
    fn exec(&mut self, sql: &str) -> Result<ExecOutcome, SqlBridgeError> {
        self.exec_with(sql, Validation::Validate)
    }

    /// Run literal SQL and collect every returned row.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::InvalidStatement` when validation is requested and fails.
    fn query_with(
        &mut self,
        sql: &str,
        validation: Validation,
    ) -> Result<QueryOutcome, SqlBridgeError>;

    /// [`Database::query_with`] with validation on.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::InvalidStatement` when validation fails.
    fn query(&mut self, sql: &str) -> Result<QueryOutcome, SqlBridgeError> {
        self.query_with(sql, Validation::Validate)
    }

    /// Translate markers, bind `args` by position and run the command.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::InvalidStatement` when the translated text does not prepare.
    fn exec_params(&mut self, sql: &str, args: &Args) -> Result<ExecOutcome, SqlBridgeError>;

    /// Translate markers, bind `args` by position and collect the rows.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::InvalidStatement` when the translated text does not prepare.
    fn query_params(&mut self, sql: &str, args: &Args) -> Result<QueryOutcome, SqlBridgeError>;

    /// Most recent auto-generated row id of this connection, `-1` when not open.
    fn get_last_insertion(&self) -> i64;
}
