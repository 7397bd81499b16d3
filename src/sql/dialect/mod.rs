//! SQL dialect definitions and formatting rules.
//!
//! Materialized tables are written to one of two backing engines. Their
//! differences are small but matter for generated DDL and literals:
//!
//! - Array column types: `INTEGER ARRAY` (H2) vs `INTEGER[]` (DuckDB)
//! - Array literals: `array[...]` (H2) vs `list_value(...)` (DuckDB)
//! - Float array elements carry a `::FLOAT`/`::DOUBLE` cast on DuckDB
//! - Timestamp literals: ISO `T` separator (H2) vs space (DuckDB)
//!
//! # Usage
//!
//! ```ignore
//! use babeldb::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::DuckDb;
//! let lit = dialect.array_literal(&["'1'".into(), "'2'".into()]);  // list_value('1', '2')
//! ```

mod duckdb;
mod h2;
pub mod helpers;

pub use duckdb::DuckDb;
pub use h2::H2;

use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::sql::types::SqlType;
use crate::table::Value;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations cover what both backing engines share.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (column name).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal with `''` escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    // =========================================================================
    // Temporal Literals
    // =========================================================================

    /// Rewrite an ISO-8601 timestamp string into the form this engine
    /// accepts inside a quoted literal.
    fn adapt_timestamp(&self, iso: &str) -> String;

    /// Rewrite a time-of-day string; `HH:mm` gains a `:00` seconds field.
    fn adapt_time(&self, time: &str) -> String {
        helpers::pad_seconds(time)
    }

    /// Render a timestamp value (unquoted).
    fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        self.adapt_timestamp(&ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }

    /// Render a time value (unquoted).
    fn format_time(&self, t: &NaiveTime) -> String {
        self.adapt_time(&t.format("%H:%M:%S%.f").to_string())
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    /// Column type of an array with the given element type name.
    fn array_type_name(&self, element: &str) -> String;

    /// Array literal from already-rendered element literals.
    fn array_literal(&self, items: &[String]) -> String;

    /// Cast suffix appended to each element of a float array literal.
    fn array_element_cast(&self, _element: &SqlType) -> Option<&'static str> {
        None
    }

    // =========================================================================
    // Data Types
    // =========================================================================

    /// Column type used in `CREATE TABLE` for a column.
    ///
    /// Arrays of text have no array declaration and are stored as a single
    /// VARCHAR. A column whose first non-null value is a UUID is UUID.
    fn column_type_name(&self, sql_type: &SqlType, first_value: Option<&Value>) -> String {
        match sql_type {
            SqlType::Array(elem) if **elem == SqlType::Text => "VARCHAR".into(),
            SqlType::Array(elem) => self.array_type_name(helpers::array_element_type_name(elem)),
            _ if matches!(first_value, Some(Value::Uuid(_))) => "UUID".into(),
            other => helpers::generic_type_name(other).into(),
        }
    }
}

/// Supported backing-engine dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// The strict embedded engine.
    #[default]
    H2,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::H2 => &H2,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h2" | "embedded" | "sqlite" => Ok(Dialect::H2),
            "duckdb" | "duck" => Ok(Dialect::DuckDb),
            _ => Err(format!("Unknown dialect: {}", s)),
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn adapt_timestamp(&self, iso: &str) -> String {
        self.dialect().adapt_timestamp(iso)
    }

    fn adapt_time(&self, time: &str) -> String {
        self.dialect().adapt_time(time)
    }

    fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        self.dialect().format_timestamp(ts)
    }

    fn format_time(&self, t: &NaiveTime) -> String {
        self.dialect().format_time(t)
    }

    fn array_type_name(&self, element: &str) -> String {
        self.dialect().array_type_name(element)
    }

    fn array_literal(&self, items: &[String]) -> String {
        self.dialect().array_literal(items)
    }

    fn array_element_cast(&self, element: &SqlType) -> Option<&'static str> {
        self.dialect().array_element_cast(element)
    }

    fn column_type_name(&self, sql_type: &SqlType, first_value: Option<&Value>) -> String {
        self.dialect().column_type_name(sql_type, first_value)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
