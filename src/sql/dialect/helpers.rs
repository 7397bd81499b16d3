//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use crate::sql::types::SqlType;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: H2, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: H2, DuckDB
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

// =============================================================================
// Data Type Names
// =============================================================================

/// Generic column type name for a scalar type.
pub fn generic_type_name(t: &SqlType) -> &'static str {
    match t {
        SqlType::Text => "VARCHAR",
        SqlType::Bool => "BOOLEAN",
        SqlType::Int16 => "SMALLINT",
        SqlType::Int32 => "INTEGER",
        SqlType::Int64 => "BIGINT",
        SqlType::Float32 => "REAL",
        SqlType::Float64 => "DOUBLE",
        SqlType::Date => "DATE",
        SqlType::Time => "TIME",
        SqlType::Timestamp => "TIMESTAMP",
        SqlType::Uuid => "UUID",
        SqlType::Array(_) => "ARRAY",
    }
}

/// Type name of an array element as written inside an array declaration.
///
/// 32-bit floats are spelled FLOAT here rather than REAL; anything without
/// a dedicated spelling is VARCHAR.
pub fn array_element_type_name(t: &SqlType) -> &'static str {
    match t {
        SqlType::Int16 => "SMALLINT",
        SqlType::Int32 => "INTEGER",
        SqlType::Int64 => "BIGINT",
        SqlType::Float32 => "FLOAT",
        SqlType::Float64 => "DOUBLE",
        SqlType::Bool => "BOOLEAN",
        SqlType::Date => "DATE",
        _ => "VARCHAR",
    }
}

// =============================================================================
// Temporal Literal Adaptation
// =============================================================================

/// Drop a trailing `Z` designator.
pub fn strip_zulu(ts: &str) -> &str {
    ts.strip_suffix('Z').unwrap_or(ts)
}

/// Pad `HH:mm` to `HH:mm:00`; longer times are left alone.
pub fn pad_seconds(time: &str) -> String {
    if time.len() == 5 {
        format!("{}:00", time)
    } else {
        time.to_string()
    }
}

/// Split an ISO timestamp into date and time parts at `T` (or a space).
pub fn split_timestamp(ts: &str) -> Option<(&str, &str)> {
    ts.split_once('T').or_else(|| ts.split_once(' '))
}
