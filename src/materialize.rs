//! Loading a [`ColumnarTable`] into a backing engine under an alias.
//!
//! A materialization is one transaction:
//!
//! ```text
//! BEGIN TRANSACTION;
//! DROP TABLE IF EXISTS <alias>;
//! CREATE TABLE <alias> ("col" TYPE, ...);
//! INSERT INTO <alias> VALUES (...), (...);
//! COMMIT;
//! ```
//!
//! Running it twice with the same table leaves the same final state.

use tracing::{debug, warn};

use crate::backend::{BackendResult, BackingConnection};
use crate::sql::ddl::{ColumnDef, CreateTable, DropTable};
use crate::sql::dml::Insert;
use crate::sql::token::{Token, TokenStream};
use crate::sql::Dialect;
use crate::table::ColumnarTable;

/// `CREATE TABLE` for `table` under `alias`.
pub fn create_table(table: &ColumnarTable, alias: &str, dialect: Dialect) -> CreateTable {
    let d = dialect.dialect();
    CreateTable::new(alias).columns(table.columns().iter().map(|col| {
        let first = col.data.first_non_null();
        ColumnDef::new(
            col.name.clone(),
            d.column_type_name(&col.sql_type(), first.as_ref()),
        )
    }))
}

/// Batched `INSERT` of every row of `table`.
pub fn insert_rows(table: &ColumnarTable, alias: &str) -> Insert {
    let types = table.types();
    Insert::into(alias).values_many(table.rows().map(|row| {
        row.iter()
            .zip(&types)
            .map(|(value, sql_type)| Token::literal(value, sql_type))
            .collect()
    }))
}

/// The full transactional script. The `INSERT` is omitted for an empty table.
pub fn build_script(table: &ColumnarTable, alias: &str, dialect: Dialect) -> String {
    let mut ts = TokenStream::new();
    ts.push(Token::Begin)
        .space()
        .push(Token::Transaction)
        .semicolon()
        .newline();

    ts.append(&DropTable::new(alias).if_exists().to_tokens())
        .semicolon()
        .newline();
    ts.append(&create_table(table, alias, dialect).to_tokens())
        .semicolon()
        .newline();

    let insert = insert_rows(table, alias);
    if !insert.is_empty() {
        ts.append(&insert.to_tokens()).semicolon().newline();
    }

    ts.push(Token::Commit).semicolon();
    ts.serialize(dialect)
}

/// Materialize `table` as `alias` on `connection`.
///
/// On failure the transaction is rolled back and the backing engine's
/// error is returned unchanged.
pub fn materialize(
    table: &ColumnarTable,
    alias: &str,
    connection: &dyn BackingConnection,
) -> BackendResult<()> {
    let dialect = connection.dialect();
    let script = build_script(table, alias, dialect);
    debug!(alias, dialect = dialect.dialect().name(), sql = %script, "materializing");

    if let Err(err) = connection.execute_batch(&script) {
        let mut rollback = TokenStream::new();
        rollback.push(Token::Rollback).semicolon();
        if let Err(rollback) = connection.execute_batch(&rollback.serialize(dialect)) {
            warn!(alias, error = %rollback, "rollback after failed materialization");
        }
        return Err(err);
    }
    Ok(())
}
