// SQLite module - the adapter over rusqlite
//
// - config: open options and builder
// - params: typed, positional argument binding
// - query: value-to-text conversion and result building
// - connection: the `Database` implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteDatabase;
pub use query::build_result_set;
