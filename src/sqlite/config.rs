use std::time::Duration;

use rusqlite::OpenFlags;

use super::connection::SqliteDatabase;

/// Options for opening a `SQLite` database file.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    pub read_only: bool,
    pub busy_timeout: Option<Duration>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            read_only: false,
            busy_timeout: None,
        }
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.read_only {
            base | OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        }
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.opts.read_only = read_only;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a `SqliteDatabase` with these options. Check `good()` for the outcome.
    #[must_use]
    pub fn build(self) -> SqliteDatabase {
        let mut db = SqliteDatabase::new();
        db.open(&self.finish());
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_drops_create_flag() {
        let opts = SqliteOptionsBuilder::new("x.db").read_only(true).finish();
        assert!(opts.open_flags().contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!opts.open_flags().contains(OpenFlags::SQLITE_OPEN_CREATE));

        let opts = SqliteOptions::new("x.db");
        assert!(opts.open_flags().contains(OpenFlags::SQLITE_OPEN_CREATE));
    }
}
