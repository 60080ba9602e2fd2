use std::borrow::Cow;
use std::fmt::Write;

mod scanner;

use scanner::scan_digits;

/// Placeholder style an engine expects natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Numbered markers like `$1` (PostgreSQL).
    Postgres,
    /// Bare positional markers `?` (SQLite).
    Sqlite,
}

/// Rewrite parameter markers into the `target` engine's native form.
///
/// * `Sqlite`: every `$<digits>` becomes a bare `?`. The digit value is ignored, markers bind by
///   occurrence order, so `$2, $1` binds the first argument to the first marker.
/// * `Postgres`: every `?` (and every `?<digits>`, consumed as one marker) becomes `$k` where `k`
///   counts occurrences from 1. Markers already written as `$n` are copied unchanged.
///
/// Warning: this is marker recognition only. String literals, quoted identifiers and comments
/// are not understood, so `'?'` inside a literal is rewritten like any other marker. Pass such
/// values as arguments instead of inlining them.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut counter = 0usize;
    let mut idx = 0;

    while idx < bytes.len() {
        let end = match (target, bytes[idx]) {
            (PlaceholderStyle::Sqlite, b'$') => scan_digits(bytes, idx + 1),
            (PlaceholderStyle::Postgres, b'?') => {
                Some(scan_digits(bytes, idx + 1).unwrap_or(idx + 1))
            }
            _ => None,
        };

        let Some(end) = end else {
            idx += 1;
            continue;
        };

        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
        buf.push_str(&sql[copied..idx]);
        match target {
            PlaceholderStyle::Sqlite => buf.push('?'),
            PlaceholderStyle::Postgres => {
                counter += 1;
                // writing into a String cannot fail
                let _ = write!(buf, "${counter}");
            }
        }
        copied = end;
        idx = end;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_bare_markers_to_postgres() {
        let sql = "select * from t where a = ? and b = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select * from t where a = $1 and b = $2");
    }

    #[test]
    fn translates_numbered_markers_to_sqlite() {
        let sql = "insert into t values($1, $2)";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert_eq!(res, "insert into t values(?, ?)");
    }

    #[test]
    fn digit_value_is_ignored_for_sqlite() {
        let sql = "select $12, $3, $12";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert_eq!(res, "select ?, ?, ?");
    }

    #[test]
    fn numbered_sqlite_markers_are_renumbered_by_occurrence() {
        let sql = "select ?3, ?, ?1";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select $1, $2, $3");
    }

    #[test]
    fn dollar_without_digits_is_copied() {
        let sql = "select $tag$x$tag$, price$ from t where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert_eq!(res, "select $tag$x$tag$, price$ from t where a = ?");
    }

    #[test]
    fn native_markers_are_left_alone() {
        let sql = "select * from t where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert!(matches!(res, Cow::Borrowed(_)));

        let sql = "select * from t where a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert!(matches!(res, Cow::Borrowed(_)));
    }

    #[test]
    fn literals_are_not_special() {
        let sql = "select '?' , ? -- ?\n";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select '$1' , $2 -- $3\n");
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let sql = "select 'größe', ? from tabelle_ä";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select 'größe', $1 from tabelle_ä");
    }

    #[test]
    fn count_matches_occurrences() {
        let n = 25;
        let sql = vec!["?"; n].join(",");
        let res = translate_placeholders(&sql, PlaceholderStyle::Postgres);
        let expected: Vec<String> = (1..=n).map(|i| format!("${i}")).collect();
        assert_eq!(res, expected.join(","));

        let back = translate_placeholders(&res, PlaceholderStyle::Sqlite);
        assert_eq!(back, sql);
    }

    #[test]
    fn marker_at_end_of_text() {
        assert_eq!(
            translate_placeholders("limit ?", PlaceholderStyle::Postgres),
            "limit $1"
        );
        assert_eq!(
            translate_placeholders("limit $9", PlaceholderStyle::Sqlite),
            "limit ?"
        );
    }
}
