use rusqlite::types::ValueRef;
use rusqlite::{Connection, Statement};

use crate::error::SqlBridgeError;
use crate::results::ResultSet;
use crate::sanitize::sanitize_owned;

const REAL_TO_TEXT: &str = "SELECT CAST(?1 AS TEXT)";

/// Convert one column value to text the way `SQLite` itself renders it.
///
/// REAL values go through the engine's own `CAST(... AS TEXT)` on the same connection so the
/// digits match what `sqlite3_column_text` would produce. TEXT and BLOB bytes are sanitized,
/// NULL becomes the empty string.
///
/// # Errors
///
/// Returns `SqlBridgeError::SqliteError` if the REAL conversion statement fails.
pub fn sqlite_value_to_text(
    conn: &Connection,
    value: ValueRef<'_>,
) -> Result<String, SqlBridgeError> {
    match value {
        ValueRef::Null => Ok(String::new()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(f) => {
            let mut stmt = conn.prepare_cached(REAL_TO_TEXT)?;
            let text = stmt.query_row([f], |row| row.get::<_, String>(0))?;
            Ok(text)
        }
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(sanitize_owned(bytes)),
    }
}

/// Step a prepared (and bound) statement to completion, appending its rows to `result_set`.
///
/// Column names are taken once per statement and shared by all of its rows.
///
/// # Errors
///
/// Returns `SqlBridgeError` if stepping or value conversion fails.
pub fn build_result_set(
    conn: &Connection,
    stmt: &mut Statement<'_>,
    result_set: &mut ResultSet,
) -> Result<(), SqlBridgeError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();
    // a statement without columns (DDL, plain DML) in a script keeps the previous names
    if col_count > 0 || result_set.get_column_names().is_none() {
        result_set.set_column_names(column_names);
    }

    let mut rows_iter = stmt.raw_query();
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_value_to_text(conn, row.get_ref(i)?)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(())
}

/// Step a statement to completion, discarding any rows, and report the change count.
///
/// # Errors
///
/// Returns `SqlBridgeError::SqliteError` if stepping fails.
pub fn drain_statement(conn: &Connection, stmt: &mut Statement<'_>) -> Result<u64, SqlBridgeError> {
    let mut rows_iter = stmt.raw_query();
    while rows_iter.next()?.is_some() {}
    Ok(u64::try_from(conn.changes()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(conn: &Connection, sql: &str) -> Result<String, SqlBridgeError> {
        let mut stmt = conn.prepare(sql)?;
        let mut rs = ResultSet::default();
        build_result_set(conn, &mut stmt, &mut rs)?;
        Ok(rs[0].get_by_index(0).unwrap_or_default().to_string())
    }

    #[test]
    fn values_use_engine_text_form() -> Result<(), SqlBridgeError> {
        let conn = Connection::open_in_memory()?;
        assert_eq!(text_of(&conn, "SELECT 42")?, "42");
        assert_eq!(text_of(&conn, "SELECT 3.25")?, "3.25");
        assert_eq!(text_of(&conn, "SELECT 1.0")?, "1.0");
        assert_eq!(text_of(&conn, "SELECT NULL")?, "");
        assert_eq!(text_of(&conn, "SELECT 'abc'")?, "abc");
        Ok(())
    }

    #[test]
    fn invalid_stored_text_is_sanitized() -> Result<(), SqlBridgeError> {
        let conn = Connection::open_in_memory()?;
        assert_eq!(text_of(&conn, "SELECT CAST(x'61ff62' AS TEXT)")?, "ab");
        assert_eq!(text_of(&conn, "SELECT x'6869'")?, "hi");
        Ok(())
    }

    #[test]
    fn rows_keep_engine_order() -> Result<(), SqlBridgeError> {
        let conn = Connection::open_in_memory()?;
        let mut stmt =
            conn.prepare("SELECT 3 AS n UNION ALL SELECT 1 UNION ALL SELECT 2")?;
        let mut rs = ResultSet::default();
        build_result_set(&conn, &mut stmt, &mut rs)?;
        let got: Vec<_> = rs.iter().filter_map(|r| r.get("n")).collect();
        assert_eq!(got, ["3", "1", "2"]);
        Ok(())
    }
}
