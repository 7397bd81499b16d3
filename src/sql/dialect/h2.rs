//! H2 SQL dialect.
//!
//! The strict embedded engine:
//! - ANSI identifier quoting (`"`)
//! - `INTEGER ARRAY` column types and `array[...]` literals
//! - ISO timestamps keep the `T` separator

use super::helpers;
use super::SqlDialect;

/// H2 SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct H2;

impl SqlDialect for H2 {
    fn name(&self) -> &'static str {
        "h2"
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
            Some((date, time)) => format!("{}T{}", date, helpers::pad_seconds(time)),
            None => iso.to_string(),
        }
    }

    fn array_type_name(&self, element: &str) -> String {
        format!("{} ARRAY", element)
    }

    fn array_literal(&self, items: &[String]) -> String {
        format!("array[{}]", items.join(","))
    }
}
