//! Run SQL against a `SQLite` file or a `PostgreSQL` server and print the outcome as JSON.
//!
//! Usage:
//! ```bash
//! # Create a table and insert a row with typed arguments
//! sql-bridge --path app.db exec "CREATE TABLE t (id INTEGER, v TEXT)"
//! sql-bridge --path app.db exec 'INSERT INTO t VALUES ($1, $2)' 1 hello
//!
//! # Read it back; every value comes out as text
//! sql-bridge --path app.db query "SELECT * FROM t"
//!
//! # Same against PostgreSQL, connection taken from PG* variables
//! PGUSER=app PGDATABASE=main sql-bridge --backend postgres query 'SELECT * FROM t WHERE id = ?' 1
//! ```

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use sql_bridge::prelude::*;

#[derive(Parser)]
#[command(
    name = "sql-bridge",
    about = "Run SQL against SQLite or PostgreSQL through one interface",
    long_about = "Validate, execute and query SQL on either engine. Placeholders in either \
                  style are translated; results are printed as JSON with every value as text."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database engine
    #[arg(long, value_enum, default_value_t = default_backend(), global = true)]
    backend: DatabaseType,

    /// SQLite database file
    #[cfg(feature = "sqlite")]
    #[arg(long, default_value = "sql-bridge.db", global = true)]
    path: String,

    /// PostgreSQL host
    #[cfg(feature = "postgres")]
    #[arg(long, env = "PGHOST", default_value = "localhost", global = true)]
    host: String,

    /// PostgreSQL user
    #[cfg(feature = "postgres")]
    #[arg(long, env = "PGUSER", default_value = "", global = true)]
    user: String,

    /// PostgreSQL password
    #[cfg(feature = "postgres")]
    #[arg(long, env = "PGPASSWORD", default_value = "", hide_env_values = true, global = true)]
    password: String,

    /// PostgreSQL database name
    #[cfg(feature = "postgres")]
    #[arg(long, env = "PGDATABASE", default_value = "", global = true)]
    dbname: String,

    /// PostgreSQL port
    #[cfg(feature = "postgres")]
    #[arg(long, env = "PGPORT", default_value_t = sql_bridge::postgres::DEFAULT_PORT, global = true)]
    port: u16,

    /// Skip the prepare-only validation before unparameterized statements
    #[arg(long, global = true)]
    no_validate: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a command; with arguments, markers are bound in order
    Exec {
        sql: String,
        /// Positional arguments: integers, floats, anything else is text
        args: Vec<String>,
    },
    /// Run a query and print its rows
    Query { sql: String, args: Vec<String> },
    /// Prepare a statement without running it
    Validate { sql: String },
    /// Show the connection state and database details
    Info,
}

#[cfg(feature = "sqlite")]
fn default_backend() -> DatabaseType {
    DatabaseType::Sqlite
}

#[cfg(not(feature = "sqlite"))]
fn default_backend() -> DatabaseType {
    DatabaseType::Postgres
}

/// `i32` first, then `i64`, then `f64`, else text.
fn parse_arg(raw: &str) -> Param {
    if let Ok(i) = raw.parse::<i32>() {
        Param::Int(i)
    } else if let Ok(i) = raw.parse::<i64>() {
        Param::BigInt(i)
    } else if let Ok(f) = raw.parse::<f64>()
        && f.is_finite()
    {
        Param::Float(f)
    } else {
        Param::from(raw)
    }
}

fn parse_args(raw: &[String]) -> Option<Args> {
    Args::try_from(raw.iter().map(|r| parse_arg(r)).collect::<Vec<_>>()).ok()
}

fn connect_options(cli: &Cli) -> ConnectOptions {
    match cli.backend {
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => SqliteOptions::new(cli.path.clone()).into(),
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => PostgresOptions::new(
            cli.host.clone(),
            cli.user.clone(),
            cli.password.clone(),
            cli.dbname.clone(),
        )
        .with_port(cli.port)
        .into(),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), SqlBridgeError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| SqlBridgeError::ExecutionError(format!("json output: {e}")))?;
    println!("{text}");
    Ok(())
}

fn run(cli: &Cli, db: &mut AnyDatabase) -> Result<ExitCode, SqlBridgeError> {
    let validation = Validation::from(!cli.no_validate);

    match &cli.command {
        Command::Exec { sql, args } => {
            let outcome = match parse_args(args) {
                Some(args) => db.exec_params(sql, &args)?,
                None => db.exec_with(sql, validation)?,
            };
            print_json(&outcome)?;
            Ok(if outcome.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Query { sql, args } => {
            let outcome = match parse_args(args) {
                Some(args) => db.query_params(sql, &args)?,
                None => db.query_with(sql, validation)?,
            };
            match outcome {
                QueryOutcome::Rows(rows) => {
                    print_json(&rows)?;
                    Ok(ExitCode::SUCCESS)
                }
                QueryOutcome::Failed(message) => {
                    eprintln!("query failed: {message}");
                    Ok(ExitCode::FAILURE)
                }
                QueryOutcome::NotReady => {
                    eprintln!("database '{}' is not open", db.name());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Validate { sql } => {
            let valid = db.validate(sql);
            print_json(&json!({ "valid": valid }))?;
            Ok(if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Info => {
            print_json(&json!({
                "backend": db.database_type(),
                "name": db.name(),
                "state": format!("{:?}", db.state()),
                "empty": db.empty(),
                "last_insertion": db.get_last_insertion(),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut db = AnyDatabase::connect(connect_options(&cli));
    if !db.good() && !matches!(cli.command, Command::Info) {
        eprintln!("could not open {} database '{}'", cli.backend, db.name());
        return ExitCode::FAILURE;
    }

    let code = match run(&cli, &mut db) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    };
    db.close();
    code
}
