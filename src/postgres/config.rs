use std::time::Duration;

use crate::error::SqlBridgeError;

use super::connection::PostgresDatabase;

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 5432;

/// Connection parameters for a `PostgreSQL` server, passed to the driver unchanged.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub port: u16,
    pub connect_timeout: Option<Duration>,
}

impl PostgresOptions {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
            port: DEFAULT_PORT,
            connect_timeout: None,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Read the libpq environment variables `PGHOST`, `PGUSER`, `PGPASSWORD`, `PGDATABASE`
    /// and `PGPORT`. Host defaults to `localhost`, password to empty, port to 5432.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::ConfigError` if `PGUSER` or `PGDATABASE` is missing or `PGPORT`
    /// is not a port number.
    pub fn from_env() -> Result<Self, SqlBridgeError> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let port = match var("PGPORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                SqlBridgeError::ConfigError(format!("PGPORT '{raw}' is not a port: {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        let opts = Self {
            host: var("PGHOST").unwrap_or_else(|| "localhost".to_string()),
            user: var("PGUSER").unwrap_or_default(),
            password: var("PGPASSWORD").unwrap_or_default(),
            dbname: var("PGDATABASE").unwrap_or_default(),
            port,
            connect_timeout: None,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    /// Returns `SqlBridgeError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), SqlBridgeError> {
        if self.host.is_empty() {
            return Err(SqlBridgeError::ConfigError("host is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(SqlBridgeError::ConfigError("user is required".to_string()));
        }
        if self.dbname.is_empty() {
            return Err(SqlBridgeError::ConfigError("dbname is required".to_string()));
        }
        if self.port == 0 {
            return Err(SqlBridgeError::ConfigError("port is required".to_string()));
        }
        Ok(())
    }

    /// `user@host:port/dbname`, used as the adapter's name. Never contains the password.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.dbname)
    }

    pub(crate) fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname)
            .port(self.port);
        if let Some(timeout) = self.connect_timeout {
            cfg.connect_timeout(timeout);
        }
        cfg
    }
}

/// Fluent builder for `PostgreSQL` options.
#[derive(Debug, Clone)]
pub struct PostgresOptionsBuilder {
    opts: PostgresOptions,
}

impl PostgresOptionsBuilder {
    #[must_use]
    pub fn new(host: impl Into<String>, dbname: impl Into<String>) -> Self {
        Self {
            opts: PostgresOptions::new(host, String::new(), String::new(), dbname),
        }
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = password.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.opts.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> PostgresOptions {
        self.opts
    }

    /// Open a `PostgresDatabase` with these options. Check `good()` for the outcome.
    #[must_use]
    pub fn build(self) -> PostgresDatabase {
        let mut db = PostgresDatabase::new();
        db.open(&self.finish());
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_5432() {
        let opts = PostgresOptions::new("db.local", "app", "secret", "main");
        assert_eq!(opts.port, 5432);
        assert_eq!(opts.display_name(), "app@db.local:5432/main");
        assert!(!opts.display_name().contains("secret"));
    }

    #[test]
    fn missing_fields_are_reported() {
        let opts = PostgresOptionsBuilder::new("db.local", "main").finish();
        match opts.validate() {
            Err(SqlBridgeError::ConfigError(msg)) => assert_eq!(msg, "user is required"),
            other => panic!("expected config error, got {other:?}"),
        }

        let opts = PostgresOptionsBuilder::new("db.local", "main")
            .user("app")
            .port(6543)
            .finish();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.port, 6543);
    }

    #[test]
    fn pg_config_carries_fields() {
        let cfg = PostgresOptions::new("h", "u", "p", "d").with_port(1234).to_pg_config();
        assert_eq!(cfg.get_user(), Some("u"));
        assert_eq!(cfg.get_dbname(), Some("d"));
        assert_eq!(cfg.get_ports(), &[1234]);
    }
}
