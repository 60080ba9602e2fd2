//! Synchronous query layer over `SQLite` (rusqlite) and `PostgreSQL` (tokio-postgres).
//!
//! Both engines sit behind the [`Database`] trait: open a connection, validate SQL by preparing
//! it, run commands and queries with or without typed positional arguments, and read every
//! result value back as text. Placeholders written for either engine are translated for the
//! other.
//!
//! ```no_run
//! use sql_bridge::prelude::*;
//!
//! let mut db = SqliteDatabase::with_path("app.db");
//! db.exec("CREATE TABLE t (id INTEGER, v TEXT)")?;
//! db.exec_params("INSERT INTO t VALUES ($1, $2)", &args![1, "hello"])?;
//! for row in db.query("SELECT id, v FROM t")?.into_rows().iter() {
//!     println!("{} {}", row.get("id").unwrap_or_default(), row.get("v").unwrap_or_default());
//! }
//! # Ok::<(), SqlBridgeError>(())
//! ```

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("enable at least one of the `sqlite` or `postgres` features");

pub mod any;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod outcome;
pub mod prelude;
pub mod results;
pub mod sanitize;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use any::{AnyDatabase, ConnectOptions};
pub use database::Database;
pub use error::SqlBridgeError;
pub use lifecycle::ConnectionState;
pub use outcome::{ExecOutcome, QueryOutcome};
pub use results::{ResultSet, Row};
pub use translation::{PlaceholderStyle, translate_placeholders};
pub use types::{Args, DatabaseType, Param, Validation};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresDatabase, PostgresOptions, PostgresOptionsBuilder};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteDatabase, SqliteOptions, SqliteOptionsBuilder};
