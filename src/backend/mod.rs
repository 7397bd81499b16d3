//! Backing relational engines.
//!
//! Materialized tables and rewritten queries run on a
//! [`BackingConnection`]. The SQLite implementation is always available;
//! connections are shared per destination through a [`ConnectionCache`].
//! [`ConnectionFederation`] answers `QUERY_DB` and registry refreshes from
//! the configured connections.

mod cache;
mod federation;
pub mod local_files;
mod sqlite;

pub use cache::{connect, ConnectionCache};
pub use federation::ConnectionFederation;
pub use sqlite::SqliteConnection;

use crate::sql::Dialect;
use crate::table::{ColumnarTable, TableError};

/// Errors raised by a backing engine.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection lock poisoned")]
    Poisoned,

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A session on a backing engine.
///
/// `execute_batch` must accept several `;`-separated statements including
/// explicit `BEGIN TRANSACTION` / `COMMIT`.
pub trait BackingConnection: Send + Sync {
    fn execute_batch(&self, sql: &str) -> BackendResult<()>;

    /// Run one statement and read its result set. A statement without a
    /// result set yields a one-row `res` table holding `Ran <sql>`.
    fn query(&self, sql: &str) -> BackendResult<ColumnarTable>;

    /// Dialect used to generate SQL for this engine.
    fn dialect(&self) -> Dialect;
}

/// Table returned for statements that produce no rows.
pub(crate) fn ran_table(sql: &str) -> ColumnarTable {
    ColumnarTable::single_text("res", vec![Some(format!("Ran {}", sql))])
}
