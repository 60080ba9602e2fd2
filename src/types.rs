use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::SqlBridgeError;

/// A single argument bound into a parameterized statement.
///
/// Text is carried as raw bytes: callers frequently hold text that came from files or sockets
/// and may not be well-formed. It is sanitized when bound, see [`crate::sanitize`].
/// ```rust
/// use sql_bridge::prelude::*;
///
/// let params = vec![Param::Int(1), Param::from("alice"), Param::Float(2.5)];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Signed 32-bit integer
    Int(i32),
    /// Signed 64-bit integer
    BigInt(i64),
    /// Double-precision float
    Float(f64),
    /// Text, possibly containing invalid UTF-8
    Text(Vec<u8>),
}

impl Param {
    /// Build a text argument from raw bytes without checking their encoding.
    #[must_use]
    pub fn text_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Param::Text(bytes.into())
    }

    #[must_use]
    pub fn as_text_bytes(&self) -> Option<&[u8]> {
        if let Param::Text(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Short tag used in log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Param::Int(_) => "int",
            Param::BigInt(_) => "bigint",
            Param::Float(_) => "float",
            Param::Text(_) => "text",
        }
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::BigInt(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.as_bytes().to_vec())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value.into_bytes())
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.as_bytes().to_vec())
    }
}

/// Ordered, non-empty list of arguments for a parameterized call.
///
/// There is no way to build an empty `Args`; statements without arguments go through the
/// unparameterized `exec`/`query` paths. Use the [`args!`](crate::args) macro for literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Args(Vec<Param>);

impl Args {
    #[must_use]
    pub fn new(first: impl Into<Param>) -> Self {
        Args(vec![first.into()])
    }

    /// Append an argument, builder style.
    #[must_use]
    pub fn with(mut self, value: impl Into<Param>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn push(&mut self, value: impl Into<Param>) {
        self.0.push(value.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Param] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    /// Iterate `(position, argument)` pairs with 1-based positions, the way engines number
    /// their markers.
    pub fn positions(&self) -> impl Iterator<Item = (usize, &Param)> {
        self.0.iter().enumerate().map(|(idx, param)| (idx + 1, param))
    }
}

impl TryFrom<Vec<Param>> for Args {
    type Error = SqlBridgeError;

    fn try_from(params: Vec<Param>) -> Result<Self, Self::Error> {
        if params.is_empty() {
            Err(SqlBridgeError::NoArguments)
        } else {
            Ok(Args(params))
        }
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build an [`Args`] from one or more values convertible into [`Param`].
///
/// `args![]` does not compile.
/// ```rust
/// use sql_bridge::args;
///
/// let args = args![1, "hello", 2.5_f64];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $crate::types::Args::new($first)$(.with($rest))*
    };
}

/// Whether `exec`/`query` run the prepare-only validation step first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Prepare the text first and return `InvalidStatement` if the engine rejects it.
    #[default]
    Validate,
    /// Execute directly; malformed text shows up as a failed outcome.
    Skip,
}

impl Validation {
    #[must_use]
    pub fn enabled(self) -> bool {
        matches!(self, Validation::Validate)
    }
}

impl From<bool> for Validation {
    fn from(validate: bool) -> Self {
        if validate {
            Validation::Validate
        } else {
            Validation::Skip
        }
    }
}

/// The database engines this crate can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `SQLite` database file
    #[cfg(feature = "sqlite")]
    Sqlite,
    /// `PostgreSQL` server
    #[cfg(feature = "postgres")]
    Postgres,
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => f.write_str("sqlite"),
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => f.write_str("postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vec_is_rejected() {
        let res = Args::try_from(Vec::new());
        assert!(matches!(res, Err(SqlBridgeError::NoArguments)));
    }

    #[test]
    fn macro_keeps_argument_order() {
        let args = crate::args![7, 9_i64, "x", 1.5_f64];
        let kinds: Vec<_> = args.iter().map(Param::kind).collect();
        assert_eq!(kinds, ["int", "bigint", "text", "float"]);
        let positions: Vec<_> = args.positions().map(|(pos, _)| pos).collect();
        assert_eq!(positions, [1, 2, 3, 4]);
    }

    #[test]
    fn text_bytes_are_not_checked() {
        let param = Param::text_bytes(vec![b'a', 0xff]);
        assert_eq!(param.as_text_bytes(), Some(&[b'a', 0xff][..]));
    }

    #[test]
    fn validation_from_bool() {
        assert_eq!(Validation::from(true), Validation::Validate);
        assert!(!Validation::from(false).enabled());
        assert!(Validation::default().enabled());
    }
}
