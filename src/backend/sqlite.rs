//! SQLite backing engine.

use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use super::{ran_table, BackendError, BackendResult, BackingConnection};
use crate::config::ConnectionConfig;
use crate::sql::{Dialect, SqlType};
use crate::table::{ColumnData, ColumnarTable, Value};

/// A single SQLite session, serialized behind a mutex.
pub struct SqliteConnection {
    conn: Mutex<Connection>,
    dialect: Dialect,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Open an in-memory database.
    pub fn open_in_memory() -> BackendResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Open the database described by `config`.
    pub fn open(config: &ConnectionConfig) -> BackendResult<Self> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            dialect: Dialect::H2,
        }
    }

    /// Generate materialization SQL in another dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

impl BackingConnection for SqliteConnection {
    fn execute_batch(&self, sql: &str) -> BackendResult<()> {
        let conn = self.conn.lock().map_err(|_| BackendError::Poisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn query(&self, sql: &str) -> BackendResult<ColumnarTable> {
        let conn = self.conn.lock().map_err(|_| BackendError::Poisoned)?;
        let mut stmt = conn.prepare(sql)?;

        if stmt.column_count() == 0 {
            stmt.execute([])?;
            return Ok(ran_table(sql));
        }

        let columns: Vec<(String, Option<SqlType>)> = stmt
            .columns()
            .iter()
            .map(|c| {
                let declared = c.decl_type().and_then(SqlType::parse).map(storage_width);
                (c.name().to_string(), declared)
            })
            .collect();

        let mut values: Vec<Vec<Value>> = vec![Vec::new(); columns.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (i, column) in values.iter_mut().enumerate() {
                column.push(to_value(row.get_ref(i)?));
            }
        }
        debug!(rows = values.first().map(Vec::len).unwrap_or(0), "sqlite query");

        let (names, data): (Vec<String>, Vec<ColumnData>) = columns
            .into_iter()
            .zip(values)
            .map(|((name, declared), vals)| {
                let sql_type = declared.unwrap_or_else(|| storage_type(&vals));
                (name, ColumnData::from_values(&sql_type, vals))
            })
            .unzip();

        Ok(ColumnarTable::new(names, data)?)
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

fn to_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

/// SQLite stores every integer in 8 bytes and every real as a double,
/// whatever the declared width.
fn storage_width(declared: SqlType) -> SqlType {
    match declared {
        SqlType::Int16 | SqlType::Int32 => SqlType::Int64,
        SqlType::Float32 => SqlType::Float64,
        other => other,
    }
}

/// Type of an undeclared (expression) column, from its first non-null value.
fn storage_type(values: &[Value]) -> SqlType {
    match values.iter().find(|v| !v.is_null()) {
        Some(Value::Int(_)) => SqlType::Int64,
        Some(Value::Float(_)) => SqlType::Float64,
        _ => SqlType::Text,
    }
}
