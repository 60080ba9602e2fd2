use std::fmt::Write;

use tokio_postgres::{Column, Row, SimpleQueryMessage};

use crate::error::SqlBridgeError;
use crate::results::ResultSet;

use super::text::PgText;

/// Wrap a prepared statement so the server renders every output column with its type's own
/// output function. `format('%s', ..)` prints `t`/`f` booleans, honours `TimeZone` and
/// `DateStyle`, and turns NULL into the empty string.
///
/// The statement's trailing semicolons are dropped, and it sits on its own lines so a trailing
/// line comment cannot swallow the closing parenthesis.
#[must_use]
pub fn text_projection(sql: &str, column_count: usize) -> String {
    let body = sql.trim_end().trim_end_matches(';');
    let mut aliases = String::new();
    let mut projection = String::new();
    for idx in 1..=column_count {
        let sep = if idx == 1 { "" } else { ", " };
        let _ = write!(aliases, "{sep}c{idx}");
        let _ = write!(projection, "{sep}format('%s', c{idx})");
    }
    format!("WITH bridge_q({aliases}) AS (\n{body}\n) SELECT {projection} FROM bridge_q")
}

fn skip_leading_noise(mut sql: &str) -> &str {
    loop {
        let trimmed = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = trimmed.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, after)| after);
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, after)| after);
        } else {
            return trimmed;
        }
    }
}

/// Whether `sql` can be the body of the `WITH` in [`text_projection`].
///
/// A failed prepare aborts an open transaction, so only statement kinds known to fit are
/// projected: queries, `VALUES`, `TABLE`, DML (with `RETURNING`), and `WITH` queries that do not
/// modify data.
#[must_use]
pub fn is_projectable(sql: &str) -> bool {
    let mut words = skip_leading_noise(sql)
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty());
    match words.next().map(str::to_ascii_lowercase).as_deref() {
        Some("select" | "values" | "table" | "insert" | "update" | "delete") => true,
        Some("with") => !words.any(|w| {
            ["insert", "update", "delete", "merge"]
                .iter()
                .any(|dml| w.eq_ignore_ascii_case(dml))
        }),
        _ => false,
    }
}

/// Build a result set from prepared-statement rows, naming the values after `columns` so a
/// query that matched nothing still knows its columns.
///
/// Rows usually come from the [`text_projection`] of the statement and hold server text; rows
/// of the statement itself are decoded by [`PgText`].
///
/// # Errors
/// Returns `SqlBridgeError::PostgresError` when a value has no text rendering.
pub fn build_result_set_from_rows(
    columns: &[Column],
    rows: &[Row],
) -> Result<ResultSet, SqlBridgeError> {
    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(column_names);

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            let PgText(value) = row.try_get(idx)?;
            row_values.push(value);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Collect the rows of a simple-protocol exchange. Values already arrive as the server's text;
/// NULL becomes the empty string.
///
/// A script may contain several statements. Rows of every statement are kept in order, and each
/// statement's own column names apply to its rows.
#[must_use]
pub fn build_result_set_from_simple(messages: &[SimpleQueryMessage]) -> ResultSet {
    let mut result_set = ResultSet::with_capacity(messages.len());
    let mut columns_pending = true;

    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => {
                if columns_pending {
                    let names = row
                        .columns()
                        .iter()
                        .map(|col| col.name().to_string())
                        .collect();
                    result_set.set_column_names(names);
                    columns_pending = false;
                }
                let values = (0..row.len())
                    .map(|idx| row.get(idx).unwrap_or_default().to_string())
                    .collect();
                result_set.add_row_values(values);
            }
            SimpleQueryMessage::CommandComplete(_) => columns_pending = true,
            _ => {}
        }
    }

    result_set
}

/// Change count of the last statement in a simple-protocol exchange.
#[must_use]
pub fn last_command_count(messages: &[SimpleQueryMessage]) -> u64 {
    messages
        .iter()
        .rev()
        .find_map(|message| match message {
            SimpleQueryMessage::CommandComplete(n) => Some(*n),
            _ => None,
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_renders_each_column_as_server_text() {
        assert_eq!(
            text_projection("SELECT a, b FROM t WHERE id = $1;  ", 2),
            "WITH bridge_q(c1, c2) AS (\nSELECT a, b FROM t WHERE id = $1\n) \
             SELECT format('%s', c1), format('%s', c2) FROM bridge_q"
        );
    }

    #[test]
    fn only_statements_that_fit_a_with_are_projected() {
        assert!(is_projectable("SELECT $1"));
        assert!(is_projectable("  -- lead\n /* block */ (select 1)"));
        assert!(is_projectable("INSERT INTO t VALUES ($1) RETURNING id"));
        assert!(is_projectable("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!is_projectable("WITH x AS (DELETE FROM t RETURNING id) SELECT * FROM x"));
        assert!(!is_projectable("EXPLAIN SELECT $1"));
        assert!(!is_projectable("SHOW TimeZone"));
        assert!(!is_projectable(""));
    }

    #[test]
    fn projection_survives_a_trailing_comment() {
        let sql = text_projection("SELECT now() -- when", 1);
        assert!(sql.contains("-- when\n) SELECT format('%s', c1) FROM bridge_q"));
    }
}
