//! Type overrides and the automatic upgrade pass.

use std::collections::HashMap;
use std::sync::Arc;

use super::{ColumnarTable, TypedColumn, Value};
use crate::sql::types::SqlType;

impl ColumnarTable {
    /// Return a table whose columns are cast to the requested types.
    ///
    /// Columns named in `overrides` are cast to the given type. When
    /// `autoconvert` is set, the remaining columns go through the upgrade
    /// pass: text columns holding only digit strings become integers, and
    /// integer columns whose names look temporal (`d`, `t`, `*date`,
    /// `*time`, `*year`) are promoted to DATE or TIMESTAMP. Columns that
    /// need no change keep their shared data.
    pub fn cast_types(&self, overrides: &HashMap<String, SqlType>, autoconvert: bool) -> ColumnarTable {
        self.map_columns(|col| {
            if let Some(t) = overrides.get(&col.name) {
                return if *t == col.sql_type() {
                    Arc::clone(&col.data)
                } else {
                    Arc::new(col.data.cast(t))
                };
            }
            match upgrade_target(col).filter(|_| autoconvert) {
                Some(t) if col.sql_type() == SqlType::Text => {
                    Arc::new(col.data.cast(&SqlType::Int64).cast(&t))
                }
                Some(t) => Arc::new(col.data.cast(&t)),
                None => Arc::clone(&col.data),
            }
        })
    }
}

/// Type the upgrade pass would give `col`, if it changes.
fn upgrade_target(col: &TypedColumn) -> Option<SqlType> {
    let source = col.sql_type();
    let ints: Vec<i64> = if source.is_integer() {
        col.data.values().filter_map(|v| v.as_i64()).collect()
    } else if source == SqlType::Text {
        digit_strings(col)?
    } else {
        return None;
    };
    if ints.is_empty() {
        return None;
    }

    let is_year = |n: &i64| *n > 1700 && *n <= 2200;
    let is_yyyymmdd = |n: &i64| *n > 19_000_101 && *n <= 21_001_231;

    let name = col.name.to_ascii_lowercase();
    if name == "d" || name == "t" || name.ends_with("date") || name.ends_with("time") {
        if ints.iter().all(is_year) || ints.iter().all(is_yyyymmdd) {
            Some(SqlType::Date)
        } else {
            Some(SqlType::Timestamp)
        }
    } else if name.ends_with("year") && ints.iter().all(is_year) {
        Some(SqlType::Date)
    } else if source == SqlType::Text {
        Some(SqlType::Int64)
    } else {
        None
    }
}

/// Values of a text column whose every non-null cell is a run of digits.
fn digit_strings(col: &TypedColumn) -> Option<Vec<i64>> {
    let mut out = Vec::new();
    for v in col.data.values() {
        match v {
            Value::Null => {}
            Value::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                out.push(s.parse().ok()?)
            }
            _ => return None,
        }
    }
    Some(out)
}
