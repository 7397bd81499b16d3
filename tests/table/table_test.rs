//! Columnar table construction, projection, and casting.

use std::collections::HashMap;
use std::sync::Arc;

use babeldb::sql::SqlType;
use babeldb::table::{unique_names, ColumnData, ColumnarTable, TableError, Value};
use chrono::NaiveDate;

fn trades() -> ColumnarTable {
    ColumnarTable::new(
        vec!["sym".into(), "px".into(), "qty".into()],
        vec![
            ColumnData::text([Some("AAPL"), Some("MSFT"), None]),
            ColumnData::Float64(vec![1.5, f64::NAN, 3.0]),
            ColumnData::Int64(vec![Some(10), None, Some(30)]),
        ],
    )
    .unwrap()
}

#[test]
fn test_float_nulls_are_nan() {
    let t = trades();
    assert_eq!(t.value(0, 1), Value::Float(1.5));
    assert!(t.value(1, 1).is_null());
    assert!(t.value(2, 0).is_null());
    assert!(t.value(1, 2).is_null());
}

#[test]
fn test_row_count_mismatch() {
    let err = ColumnarTable::new(
        vec!["a".into(), "b".into()],
        vec![ColumnData::Int64(vec![Some(1)]), ColumnData::Int64(vec![])],
    )
    .unwrap_err();
    assert_eq!(
        err,
        TableError::RowCountMismatch {
            column: "b".into(),
            expected: 1,
            actual: 0
        }
    );
}

#[test]
fn test_name_collisions() {
    let names: Vec<String> = ["a", "", "a", "a1", "a"].iter().map(|s| s.to_string()).collect();
    assert_eq!(unique_names(&names), vec!["a", "c1", "a1", "a11", "a2"]);

    let t = ColumnarTable::new(
        vec!["x".into(), "x".into()],
        vec![ColumnData::Int64(vec![]), ColumnData::Int64(vec![])],
    )
    .unwrap();
    assert_eq!(t.names(), vec!["x", "x1"]);
}

#[test]
fn test_projection_round_trip() {
    let t = trades();
    let reordered = t.project(&["qty", "sym", "px"], Some(&["q", "s", "p"][..])).unwrap();
    assert_eq!(reordered.names(), vec!["q", "s", "p"]);

    let back = reordered
        .project(&["s", "p", "q"], Some(&["sym", "px", "qty"][..]))
        .unwrap();
    assert_eq!(back, t);
}

#[test]
fn test_projection_shares_data() {
    let t = trades();
    let p = t.project(&["px"], None).unwrap();
    assert!(Arc::ptr_eq(&p.columns()[0].data, &t.columns()[1].data));

    let r = t.rename(&["a", "b", "c"]).unwrap();
    assert!(Arc::ptr_eq(&r.columns()[2].data, &t.columns()[2].data));
}

#[test]
fn test_projection_errors() {
    let t = trades();
    assert_eq!(
        t.project(&["nope"], None).unwrap_err(),
        TableError::UnknownColumn("nope".into())
    );
    assert!(t.project(&["px"], Some(&["a", "b"][..])).is_err());
    assert!(t.rename(&["only_one"]).is_err());
}

#[test]
fn test_set_casts_and_drops_bad_values() {
    let mut data = ColumnData::allocate(&SqlType::Int32, 3);
    data.set(0, Value::Text("42".into()));
    data.set(1, Value::Int(i64::MAX));
    data.set(2, Value::Float(7.9));
    data.set(5, Value::Int(1));

    assert_eq!(data.get(0), Value::Int(42));
    assert!(data.get(1).is_null());
    assert_eq!(data.get(2), Value::Int(7));
    assert_eq!(data.len(), 3);
}

#[test]
fn test_overrides_and_upgrade() {
    let t = ColumnarTable::new(
        vec!["trade_date".into(), "px".into(), "year".into()],
        vec![
            ColumnData::Int64(vec![Some(20240102), Some(20240103)]),
            ColumnData::text([Some("1.5"), Some("n/a")]),
            ColumnData::Int64(vec![Some(1999), Some(2001)]),
        ],
    )
    .unwrap();

    let overrides = HashMap::from([("px".to_string(), SqlType::Float64)]);
    let cast = t.cast_types(&overrides, true);

    assert_eq!(cast.types(), vec![SqlType::Date, SqlType::Float64, SqlType::Date]);
    assert_eq!(
        cast.value(1, 0),
        Value::Date(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
    );
    assert!(cast.value(1, 1).is_null());
    assert_eq!(
        cast.value(0, 2),
        Value::Date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap())
    );
}

#[test]
fn test_epoch_millis_time_column() {
    let t = ColumnarTable::new(
        vec!["time".into()],
        vec![ColumnData::Int64(vec![Some(1_700_000_000_000)])],
    )
    .unwrap();
    let cast = t.cast_types(&HashMap::new(), true);
    assert_eq!(cast.types(), vec![SqlType::Timestamp]);
    assert_eq!(cast.value(0, 0).to_string().get(..10), Some("2023-11-14"));
}
