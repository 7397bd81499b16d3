//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible with extensions:
//! - ANSI identifier quoting (`"`)
//! - `INTEGER[]` list column types built with `list_value(...)`
//! - Float list elements need an explicit cast to keep their width
//! - Timestamp literals use a space separator and always carry seconds

use super::helpers;
use super::SqlDialect;
use crate::sql::types::SqlType;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn adapt_timestamp(&self, iso: &str) -> String {
        let iso = helpers::strip_zulu(iso);
        match helpers::split_timestamp(iso) {
            Some((date, time)) => format!("{} {}", date, helpers::pad_seconds(time)),
            None => iso.to_string(),
        }
    }

    fn array_type_name(&self, element: &str) -> String {
        format!("{}[]", element)
    }

    fn array_literal(&self, items: &[String]) -> String {
        format!("list_value({})", items.join(","))
    }

    fn array_element_cast(&self, element: &SqlType) -> Option<&'static str> {
        match element {
            SqlType::Float32 => Some("::FLOAT"),
            SqlType::Float64 => Some("::DOUBLE"),
            _ => None,
        }
    }
}
