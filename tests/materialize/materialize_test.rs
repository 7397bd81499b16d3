//! Materialization scripts and their effect on a live SQLite engine.

use babeldb::backend::{BackingConnection, SqliteConnection};
use babeldb::materialize::{build_script, materialize};
use babeldb::table::ColumnData;
use babeldb::{ColumnarTable, Dialect, SqlType, Value};
use chrono::{NaiveDate, NaiveDateTime};
use sqlparser::dialect::{DuckDbDialect, GenericDialect};
use sqlparser::parser::Parser;

fn prices() -> ColumnarTable {
    ColumnarTable::new(
        vec!["sym".into(), "px".into(), "d".into()],
        vec![
            ColumnData::text(vec![Some("AAPL"), Some("O'NEIL")]),
            ColumnData::Float64(vec![1.5, f64::NAN]),
            ColumnData::Date(vec![NaiveDate::from_ymd_opt(2024, 1, 2), None]),
        ],
    )
    .unwrap()
}

fn events() -> ColumnarTable {
    let at = NaiveDateTime::parse_from_str("2024-03-04 05:06:07", "%Y-%m-%d %H:%M:%S").unwrap();
    ColumnarTable::new(
        vec!["id".into(), "ok".into(), "at".into()],
        vec![
            ColumnData::Int64(vec![Some(1), None]),
            ColumnData::Bool(vec![Some(true), Some(false)]),
            ColumnData::Timestamp(vec![Some(at), None]),
        ],
    )
    .unwrap()
}

#[test]
fn test_duckdb_script() {
    let sql = build_script(&events(), "events", Dialect::DuckDb);
    insta::assert_snapshot!(sql, @r#"
    BEGIN TRANSACTION;
    DROP TABLE IF EXISTS events;
    CREATE TABLE events ("id" BIGINT, "ok" BOOLEAN, "at" TIMESTAMP);
    INSERT INTO events VALUES (1, true, '2024-03-04 05:06:07'), (NULL, false, NULL);
    COMMIT;
    "#);
}

#[test]
fn test_scripts_parse() {
    for table in [prices(), events()] {
        let sql = build_script(&table, "temptbl0", Dialect::DuckDb);
        Parser::parse_sql(&DuckDbDialect {}, &sql).unwrap();
        let sql = build_script(&table, "temptbl0", Dialect::H2);
        Parser::parse_sql(&GenericDialect {}, &sql).unwrap();
    }
}

#[test]
fn test_round_trip_through_sqlite() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    materialize(&prices(), "temptbl0", &conn).unwrap();

    let t = conn.query("SELECT * FROM temptbl0").unwrap();
    assert_eq!(t.names(), vec!["sym", "px", "d"]);
    assert_eq!(t.types(), vec![SqlType::Text, SqlType::Float64, SqlType::Date]);
    assert_eq!(t.value(1, 0), Value::Text("O'NEIL".into()));
    assert_eq!(t.value(0, 1), Value::Float(1.5));
    assert!(t.value(1, 1).is_null());
    assert_eq!(t.value(0, 2).to_string(), "2024-01-02");
}

#[test]
fn test_rematerializing_replaces_table() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    materialize(&prices(), "temptbl0", &conn).unwrap();
    materialize(&prices(), "temptbl0", &conn).unwrap();
    let t = conn.query("SELECT COUNT(*) FROM temptbl0").unwrap();
    assert_eq!(t.value(0, 0), Value::Int(2));

    let narrower = prices().project(&["sym"], None).unwrap();
    materialize(&narrower, "temptbl0", &conn).unwrap();
    let t = conn.query("SELECT * FROM temptbl0").unwrap();
    assert_eq!(t.names(), vec!["sym"]);
}

#[test]
fn test_empty_table_creates_schema() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    materialize(&ColumnarTable::empty(["a", "b"]), "nothing", &conn).unwrap();
    let t = conn.query("SELECT * FROM nothing").unwrap();
    assert_eq!(t.names(), vec!["a", "b"]);
    assert_eq!(t.row_count(), 0);
}

#[test]
fn test_text_array_round_trip() {
    let tags = ColumnarTable::new(
        vec!["tags".into()],
        vec![ColumnData::from_values(
            &SqlType::Array(Box::new(SqlType::Text)),
            vec![
                Value::Array(vec![Value::from("ab"), Value::from("c")]),
                Value::Array(vec![Value::from("x"), Value::Null]),
            ],
        )],
    )
    .unwrap();

    let conn = SqliteConnection::open_in_memory().unwrap();
    materialize(&tags, "tags", &conn).unwrap();

    let t = conn.query("SELECT tags FROM tags").unwrap();
    assert_eq!(t.types(), vec![SqlType::Text]);
    assert_eq!(t.value(0, 0), Value::Text("[ab, c]".into()));
    assert_eq!(t.value(1, 0), Value::Text("[x, null]".into()));
}

#[test]
fn test_failure_rolls_back() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    materialize(&prices(), "kept", &conn).unwrap();

    // a reserved word as alias breaks the script after BEGIN
    assert!(materialize(&prices(), "select", &conn).is_err());

    // a dangling transaction would make this BEGIN fail
    materialize(&events(), "events", &conn).unwrap();
    let t = conn.query("SELECT COUNT(*) FROM kept").unwrap();
    assert_eq!(t.value(0, 0), Value::Int(2));
}
