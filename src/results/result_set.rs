use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

use serde::Serialize;

use super::row::{Row, build_column_index};

/// Ordered rows returned by a tuple-producing query.
///
/// Row order is the engine's; no sort is implied unless the SQL asked for one. Rows are
/// accumulated by the call that produced them, nothing here is shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<Row>,
    #[serde(skip)]
    column_names: Option<Arc<Vec<String>>>,
    #[serde(skip)]
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index: None,
        }
    }

    /// Set the column names shared by the rows added next.
    ///
    /// Called once per statement; a multi-statement batch calls it again for each statement
    /// that returns rows.
    pub fn set_column_names(&mut self, column_names: Vec<String>) {
        let index = build_column_index(&column_names);
        if index.len() < column_names.len() {
            tracing::debug!(
                columns = ?column_names,
                "duplicate column names in result, later columns shadow earlier ones"
            );
        }
        self.column_names = Some(Arc::new(column_names));
        self.column_index = Some(Arc::new(index));
    }

    /// Column names of the most recent statement, if any returned columns.
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row under the current column names.
    ///
    /// Values beyond the known columns are still stored but only reachable by index.
    pub fn add_row_values(&mut self, row_values: Vec<String>) {
        let column_names = self.column_names.clone().unwrap_or_default();
        let column_index = self.column_index.clone().unwrap_or_default();
        self.results
            .push(Row::from_parts(column_names, row_values, column_index));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.results.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.results.first()
    }
}

impl Index<usize> for ResultSet {
    type Output = Row;

    fn index(&self, index: usize) -> &Self::Output {
        &self.results[index]
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_metadata() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(vec!["id".into(), "v".into()]);
        rs.add_row_values(vec!["1".into(), "a".into()]);
        rs.add_row_values(vec!["2".into(), "b".into()]);

        assert_eq!(rs.len(), 2);
        assert_eq!(rs[1].get("v"), Some("b"));
        assert_eq!(
            serde_json::to_string(&rs).unwrap(),
            r#"[{"id":"1","v":"a"},{"id":"2","v":"b"}]"#
        );
    }

    #[test]
    fn column_names_switch_between_statements() {
        let mut rs = ResultSet::default();
        rs.set_column_names(vec!["a".into()]);
        rs.add_row_values(vec!["1".into()]);
        rs.set_column_names(vec!["b".into(), "c".into()]);
        rs.add_row_values(vec!["2".into(), "3".into()]);

        assert_eq!(rs[0].get("a"), Some("1"));
        assert_eq!(rs[0].get("b"), None);
        assert_eq!(rs[1].get("c"), Some("3"));
        assert_eq!(rs.get_column_names().map(|c| c.len()), Some(2));
    }
}
