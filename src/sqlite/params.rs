use rusqlite::Statement;

use crate::error::SqlBridgeError;
use crate::sanitize::sanitize_owned;
use crate::types::{Args, Param};

/// Bind `args` to `stmt`, one engine bind call per argument at its 1-based position.
///
/// `SQLite` quietly binds NULL to markers that receive no value, so the marker count is
/// checked up front and a mismatch is reported instead of executing a half-bound statement.
///
/// # Errors
///
/// Returns `SqlBridgeError::ParameterError` on an arity mismatch, or the engine error if a
/// bind call fails.
pub fn bind_params(stmt: &mut Statement<'_>, args: &Args) -> Result<(), SqlBridgeError> {
    let expected = stmt.parameter_count();
    if expected != args.len() {
        return Err(SqlBridgeError::ParameterError(format!(
            "statement has {expected} placeholder(s) but {} argument(s) were supplied",
            args.len()
        )));
    }

    for (pos, param) in args.positions() {
        match param {
            Param::Int(v) => stmt.raw_bind_parameter(pos, *v)?,
            Param::BigInt(v) => stmt.raw_bind_parameter(pos, *v)?,
            Param::Float(v) => stmt.raw_bind_parameter(pos, *v)?,
            // owned String: rusqlite hands it to SQLite as SQLITE_TRANSIENT, so the engine
            // keeps its own copy
            Param::Text(bytes) => stmt.raw_bind_parameter(pos, sanitize_owned(bytes))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use rusqlite::Connection;

    #[test]
    fn binds_each_type_by_position() -> Result<(), SqlBridgeError> {
        let conn = Connection::open_in_memory()?;
        let mut stmt = conn.prepare("SELECT ?, ?, ?, ?")?;
        bind_params(&mut stmt, &args![7, 9_000_000_000_i64, 0.5_f64, "txt"])?;
        let mut rows = stmt.raw_query();
        let row = rows.next()?.ok_or_else(|| {
            SqlBridgeError::ExecutionError("expected a row".into())
        })?;
        assert_eq!(row.get::<_, i64>(0)?, 7);
        assert_eq!(row.get::<_, i64>(1)?, 9_000_000_000);
        assert!((row.get::<_, f64>(2)? - 0.5).abs() < f64::EPSILON);
        assert_eq!(row.get::<_, String>(3)?, "txt");
        Ok(())
    }

    #[test]
    fn arity_mismatch_is_rejected() -> Result<(), SqlBridgeError> {
        let conn = Connection::open_in_memory()?;
        let mut stmt = conn.prepare("SELECT ?, ?")?;
        let res = bind_params(&mut stmt, &args![1]);
        assert!(matches!(res, Err(SqlBridgeError::ParameterError(_))));
        let res = bind_params(&mut stmt, &args![1, 2, 3]);
        assert!(matches!(res, Err(SqlBridgeError::ParameterError(_))));
        Ok(())
    }

    #[test]
    fn text_is_sanitized_before_binding() -> Result<(), SqlBridgeError> {
        let conn = Connection::open_in_memory()?;
        let mut stmt = conn.prepare("SELECT ?")?;
        bind_params(&mut stmt, &Args::new(Param::text_bytes(vec![b'o', 0xfe, b'k', 0])))?;
        let mut rows = stmt.raw_query();
        let row = rows.next()?.ok_or_else(|| {
            SqlBridgeError::ExecutionError("expected a row".into())
        })?;
        assert_eq!(row.get::<_, String>(0)?, "ok");
        Ok(())
    }
}
