use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A row from a query result, every value converted to text.
///
/// Column names and the name lookup map are shared by every row produced by the same
/// statement. Lookup is by name; when a statement returns the same column name twice the
/// later column wins, while both values stay reachable through [`Row::get_by_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    column_names: Arc<Vec<String>>,
    values: Vec<String>,
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    pub(crate) fn from_parts(
        column_names: Arc<Vec<String>>,
        values: Vec<String>,
        column_index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Build a standalone row; duplicate names resolve to the last column.
    #[must_use]
    pub fn new(column_names: Vec<String>, values: Vec<String>) -> Self {
        let index = Arc::new(build_column_index(&column_names));
        Self::from_parts(Arc::new(column_names), values, index)
    }

    /// Get a value by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&str> {
        self.column_index
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// Get a value by column position, in the engine's column order
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(name, value)` pairs in column order, including shadowed duplicates.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Copy into a plain name → value map.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.column_index
            .iter()
            .filter_map(|(name, &idx)| Some((name.clone(), self.values.get(idx)?.clone())))
            .collect()
    }

    fn is_visible(&self, idx: usize) -> bool {
        self.column_names
            .get(idx)
            .and_then(|name| self.column_index.get(name))
            .is_some_and(|&winner| winner == idx)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.column_index.len()))?;
        for (idx, (name, value)) in self.iter().enumerate() {
            if self.is_visible(idx) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// Name → position map where a repeated name points at its last occurrence.
pub(crate) fn build_column_index(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}
