//! Convenient imports for common functionality.
//!
//! `use sql_bridge::prelude::*;` brings in the adapter trait, both adapters, the argument
//! types and the `args!` macro.

pub use crate::any::{AnyDatabase, ConnectOptions};
pub use crate::args;
pub use crate::database::Database;
pub use crate::error::SqlBridgeError;
pub use crate::lifecycle::ConnectionState;
pub use crate::outcome::{ExecOutcome, QueryOutcome};
pub use crate::results::{ResultSet, Row};
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::{Args, DatabaseType, Param, Validation};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresDatabase, PostgresOptions, PostgresOptionsBuilder};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteDatabase, SqliteOptions, SqliteOptionsBuilder};
