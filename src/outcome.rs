use serde::Serialize;

use crate::results::ResultSet;

/// Result of a command (`exec`) that got past validation.
///
/// Keeps apart the three cases a plain boolean folds together: success, an engine-side
/// runtime failure, and a connection that was never usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecOutcome {
    /// The statement ran; `rows_affected` is the engine's change count (0 for DDL).
    Done { rows_affected: u64 },
    /// The engine rejected the statement at run time (constraint violation, arity mismatch, ...).
    Failed { message: String },
    /// The adapter is not open.
    NotReady,
}

impl ExecOutcome {
    pub(crate) fn failed(message: impl ToString) -> Self {
        ExecOutcome::Failed {
            message: message.to_string(),
        }
    }

    /// The boolean success signal.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, ExecOutcome::Done { .. })
    }

    #[must_use]
    pub fn rows_affected(&self) -> Option<u64> {
        if let ExecOutcome::Done { rows_affected } = self {
            Some(*rows_affected)
        } else {
            None
        }
    }
}

/// Result of a `query` that got past validation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows in engine order; may be empty for a valid query that matched nothing.
    Rows(ResultSet),
    /// The engine failed while executing or while the rows were being decoded.
    Failed(String),
    /// The adapter is not open.
    NotReady,
}

impl QueryOutcome {
    pub(crate) fn failed(message: impl ToString) -> Self {
        QueryOutcome::Failed(message.to_string())
    }

    /// Collapse to a result set, empty for failures and unready connections.
    ///
    /// This loses the distinction between "no rows" and "failed"; match on the outcome when it
    /// matters.
    #[must_use]
    pub fn into_rows(self) -> ResultSet {
        match self {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Failed(_) | QueryOutcome::NotReady => ResultSet::default(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> Option<&ResultSet> {
        if let QueryOutcome::Rows(rows) = self {
            Some(rows)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        !matches!(self, QueryOutcome::Rows(_))
    }
}
