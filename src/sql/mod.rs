//! SQL generation for materialized tables.
//!
//! Statements are built from [`token::Token`]s and serialized per
//! [`dialect::Dialect`]:
//!
//! - [`types`]: physical column types
//! - [`ddl`]: `CREATE TABLE` / `DROP TABLE`
//! - [`dml`]: multi-row `INSERT`

pub mod ddl;
pub mod dialect;
pub mod dml;
pub mod token;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{Dialect, SqlDialect};
pub use types::SqlType;
