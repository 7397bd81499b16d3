//! Typed tables from 2-D string grids.
//!
//! Shared by the delimited and HTML readers: classify every cell, merge per
//! column, then convert each cell to the column's final type.

use std::collections::HashMap;

use crate::infer::{classify, convert::convert, merge_all};
use crate::sql::types::SqlType;
use crate::table::{ColumnData, ColumnarTable, TableError};

/// Build a table from rows of cells.
///
/// The first row sets the column count. With `header` set it also supplies
/// the column names; otherwise columns are named `c0`, `c1`, ... Cells past
/// the column count are dropped and missing cells are null. Overrides are
/// looked up by column name and win over inference.
pub fn from_string_grid(
    rows: Vec<Vec<Option<String>>>,
    overrides: &HashMap<String, SqlType>,
    header: bool,
) -> Result<ColumnarTable, TableError> {
    let Some(first) = rows.first() else {
        return Ok(ColumnarTable::empty(Vec::<String>::new()));
    };

    let names: Vec<String> = if header {
        first
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("").trim().to_string())
            .collect()
    } else {
        (0..first.len()).map(|i| format!("c{}", i)).collect()
    };
    let body = if header { &rows[1..] } else { &rows[..] };

    let mut data = Vec::with_capacity(names.len());
    for (c, name) in names.iter().enumerate() {
        let sql_type = match overrides.get(name) {
            Some(t) => t.clone(),
            None => merge_all(body.iter().filter_map(|row| cell(row, c)).map(classify)).to_sql_type(),
        };

        let mut column = ColumnData::allocate(&sql_type, body.len());
        for (r, row) in body.iter().enumerate() {
            if let Some(token) = cell(row, c) {
                column.set(r, convert(token, &sql_type));
            }
        }
        data.push(column);
    }

    ColumnarTable::new(names, data)
}

fn cell(row: &[Option<String>], c: usize) -> Option<&str> {
    row.get(c).and_then(|v| v.as_deref())
}
