// PostgreSQL module - the adapter over tokio-postgres, driven synchronously
//
// - config: connection options and builder
// - params: typed argument encoding for the extended protocol
// - text: client-side rendering of binary result values
// - query: server-text projection, result extraction and building
// - connection: the `Database` implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod text;

pub use config::{DEFAULT_PORT, PostgresOptions, PostgresOptionsBuilder};
pub use connection::PostgresDatabase;
pub use params::Params;
pub use query::{
    build_result_set_from_rows, build_result_set_from_simple, is_projectable, text_projection,
};
pub use text::PgText;
