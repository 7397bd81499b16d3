//! In-memory columnar tables.
//!
//! A [`ColumnarTable`] is an immutable list of named, typed columns that all
//! have the same row count. Every ingestion path produces one, and the
//! materializer turns one into a temporary table on the backing engine.
//!
//! Column data lives behind an `Arc`, so [`ColumnarTable::project`] and
//! [`ColumnarTable::rename`] never copy cells.

mod cast;
mod column;
mod value;

pub use column::{ColumnData, TypedColumn};
pub use value::Value;

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::sql::types::SqlType;

/// Errors from constructing or reshaping a table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("got {names} column names for {columns} columns")]
    NameCountMismatch { names: usize, columns: usize },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("no column named '{0}'")]
    UnknownColumn(String),
}

/// Immutable, column-major result table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarTable {
    columns: Vec<TypedColumn>,
    row_count: usize,
}

impl ColumnarTable {
    /// Build a table from names and column data.
    ///
    /// Names are made unique (see [`unique_names`]) and all columns must
    /// have the same length.
    pub fn new(names: Vec<String>, data: Vec<ColumnData>) -> Result<Self, TableError> {
        if names.len() != data.len() {
            return Err(TableError::NameCountMismatch {
                names: names.len(),
                columns: data.len(),
            });
        }
        let names = unique_names(&names);
        let columns = names
            .into_iter()
            .zip(data)
            .map(|(name, data)| TypedColumn::new(name, data))
            .collect();
        Self::from_columns(columns)
    }

    fn from_columns(columns: Vec<TypedColumn>) -> Result<Self, TableError> {
        let row_count = columns.first().map(TypedColumn::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(TableError::RowCountMismatch {
                column: bad.name.clone(),
                expected: row_count,
                actual: bad.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    /// Zero-row table of text columns.
    pub fn empty<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = unique_names(&names.into_iter().map(Into::into).collect::<Vec<_>>());
        let columns = names
            .into_iter()
            .map(|name| TypedColumn::new(name, ColumnData::Text(Vec::new())))
            .collect();
        Self {
            columns,
            row_count: 0,
        }
    }

    /// Single-column text table.
    pub fn single_text(name: &str, values: Vec<Option<String>>) -> Self {
        Self {
            row_count: values.len(),
            columns: vec![TypedColumn::new(name, ColumnData::Text(values))],
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[TypedColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn types(&self) -> Vec<SqlType> {
        self.columns.iter().map(TypedColumn::sql_type).collect()
    }

    /// Cell at (row, column); `Null` when out of range.
    pub fn value(&self, row: usize, column: usize) -> Value {
        self.columns
            .get(column)
            .map(|c| c.get(row))
            .unwrap_or(Value::Null)
    }

    /// Iterate rows as vectors of values.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count).map(move |row| self.columns.iter().map(|c| c.get(row)).collect())
    }

    /// Select columns by name, optionally renaming them.
    ///
    /// The new table shares column data with this one.
    pub fn project(&self, names: &[&str], new_names: Option<&[&str]>) -> Result<Self, TableError> {
        if let Some(new_names) = new_names {
            if new_names.len() != names.len() {
                return Err(TableError::NameCountMismatch {
                    names: new_names.len(),
                    columns: names.len(),
                });
            }
        }
        let mut out_names = Vec::with_capacity(names.len());
        let mut out_data = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let col = self
                .column(name)
                .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
            out_names.push(new_names.map(|n| n[i]).unwrap_or(*name).to_string());
            out_data.push(Arc::clone(&col.data));
        }
        self.with_shared(out_names, out_data)
    }

    /// Same columns under new names.
    pub fn rename<S: AsRef<str>>(&self, new_names: &[S]) -> Result<Self, TableError> {
        if new_names.len() != self.columns.len() {
            return Err(TableError::NameCountMismatch {
                names: new_names.len(),
                columns: self.columns.len(),
            });
        }
        let names = new_names.iter().map(|n| n.as_ref().to_string()).collect();
        let data = self.columns.iter().map(|c| Arc::clone(&c.data)).collect();
        self.with_shared(names, data)
    }

    fn with_shared(&self, names: Vec<String>, data: Vec<Arc<ColumnData>>) -> Result<Self, TableError> {
        let columns = unique_names(&names)
            .into_iter()
            .zip(data)
            .map(|(name, data)| TypedColumn { name, data })
            .collect();
        Self::from_columns(columns)
    }

    /// Replace the data of each column, keeping names.
    pub(crate) fn map_columns(&self, mut f: impl FnMut(&TypedColumn) -> Arc<ColumnData>) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| TypedColumn {
                name: c.name.clone(),
                data: f(c),
            })
            .collect();
        Self {
            columns,
            row_count: self.row_count,
        }
    }
}

/// Make column names unique.
///
/// Blank names become `c<i>` (their position). A name already taken gets
/// the smallest numeric suffix `n >= 1` that makes it unique.
pub fn unique_names(names: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("c{}", i)
            } else {
                name.clone()
            };
            let unique = unique_name(&base, &seen);
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

fn unique_name(base: &str, seen: &HashSet<String>) -> String {
    if !seen.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !seen.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
