//! Backing engine connection configuration.
//!
//! Supports configuration via environment variables:
//! - `BABEL_DB_DRIVER`: Backing engine driver (sqlite, duckdb)
//! - `BABEL_DB_PATH`: Database file, or `:memory:` (the default)

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::sql::Dialect;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}. Supported: sqlite, duckdb")]
    UnsupportedDriver(String),
}

/// Supported backing engine drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// SQLite (file or in-memory), spoken to with the strict embedded dialect.
    Sqlite,
    /// DuckDB (file or in-memory)
    DuckDb,
}

impl FromStr for Driver {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" | "embedded" | "h2" => Ok(Driver::Sqlite),
            "duckdb" | "duck" => Ok(Driver::DuckDb),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite",
            Driver::DuckDb => "duckdb",
        }
    }

    /// Dialect used to generate DDL/DML for this engine.
    pub fn default_dialect(&self) -> Dialect {
        match self {
            Driver::Sqlite => Dialect::H2,
            Driver::DuckDb => Dialect::DuckDb,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a backing engine lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: Driver,
    /// Database file path; empty or `:memory:` for an in-memory engine.
    pub path: String,
}

impl ConnectionConfig {
    /// In-memory SQLite.
    pub fn in_memory() -> Self {
        Self {
            driver: Driver::Sqlite,
            path: ":memory:".to_string(),
        }
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            path: path.into(),
        }
    }

    pub fn duckdb(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::DuckDb,
            path: path.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `BABEL_DB_DRIVER`: sqlite or duckdb
    ///
    /// Optional:
    /// - `BABEL_DB_PATH`: Database file (defaults to in-memory)
    pub fn from_env() -> Result<Self, ConnectionError> {
        let driver_str = env::var("BABEL_DB_DRIVER")
            .map_err(|_| ConnectionError::MissingEnvVar("BABEL_DB_DRIVER".to_string()))?;
        let driver = driver_str.parse()?;
        let path = env::var("BABEL_DB_PATH").unwrap_or_default();
        Ok(Self { driver, path })
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_empty() || self.path == ":memory:"
    }

    /// The path or `:memory:`.
    pub fn to_connection_string(&self) -> String {
        if self.is_in_memory() {
            ":memory:".to_string()
        } else {
            self.path.clone()
        }
    }
}
