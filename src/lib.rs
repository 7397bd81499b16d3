//! # BabelDB
//!
//! A query federation layer that sits in front of a relational engine.
//!
//! ## Architecture
//!
//! SQL text may embed pseudo-functions (`QUERY_WEB(...)`, `QUERY_DATA(...)`,
//! `QUERY_SYM(...)`, `QUERY_SYMBOLS(...)`, `QUERY_DB(...)`) and symbol
//! references (`FROM S_AAPL`). Each one is pulled out as a command, run, and
//! loaded into a temporary table; the rewritten query then reads those tables.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      SQL text                           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [translate]
//! ┌─────────────────────────────────────────────────────────┐
//! │         rewritten SQL + ordered command list            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dispatch + ingest + infer]
//! ┌─────────────────────────────────────────────────────────┐
//! │              ColumnarTable per command                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [materialize]
//! ┌─────────────────────────────────────────────────────────┐
//! │     DROP / CREATE / INSERT on the backing engine        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [backend]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  query result                           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod infer;
pub mod ingest;
pub mod materialize;
pub mod registry;
pub mod sql;
pub mod table;
pub mod translate;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::backend::{BackingConnection, ConnectionCache, ConnectionFederation, SqliteConnection};
    pub use crate::dispatch::{Dispatcher, FederatedExecutor, Fetcher};
    pub use crate::engine::BabelDb;
    pub use crate::error::{BabelError, BabelResult};
    pub use crate::infer::InferredType;
    pub use crate::registry::{SymbolEntry, SymbolRegistry};
    pub use crate::sql::{Dialect, SqlDialect, SqlType};
    pub use crate::table::{ColumnData, ColumnarTable, TypedColumn, Value};
    pub use crate::translate::{translate, Command, CommandKind, QueryTranslation};
}

pub use engine::BabelDb;
pub use error::{BabelError, BabelResult};
pub use sql::{Dialect, SqlType};
pub use table::{ColumnarTable, Value};
pub use translate::translate;
