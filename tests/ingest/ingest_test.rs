//! Payload ingestion end to end: format detection, parsing, inference.

use babeldb::ingest::{detect_format, from_text, parse_overrides, Format, IngestError};
use babeldb::sql::SqlType;
use babeldb::Value;
use chrono::NaiveDate;

#[test]
fn test_csv_with_header() {
    let t = from_text("sym,px,qty\nAAPL,1.5,10\nMSFT,2,20\n", None, None, false).unwrap();
    assert_eq!(t.names(), vec!["sym", "px", "qty"]);
    assert_eq!(t.types(), vec![SqlType::Text, SqlType::Float64, SqlType::Int64]);
    assert_eq!(t.value(1, 1), Value::Float(2.0));
}

#[test]
fn test_headerless_rows() {
    let t = from_text("1.5,2.5\n3.5,4.5\n", None, None, false).unwrap();
    assert_eq!(t.names(), vec!["c0", "c1"]);
    assert_eq!(t.row_count(), 2);
}

#[test]
fn test_separator_detection() {
    let t = from_text("a|b\n1|x\n2|y", None, None, false).unwrap();
    assert_eq!(t.names(), vec!["a", "b"]);

    let t = from_text("a\tb\n1\tx\n", None, None, false).unwrap();
    assert_eq!(t.names(), vec!["a", "b"]);
}

#[test]
fn test_mixed_column_widens_to_text() {
    let t = from_text("name,v\nx,1\ny,abc\nz,\n", None, None, false).unwrap();
    assert_eq!(t.types()[1], SqlType::Text);
    assert_eq!(t.value(1, 1), Value::Text("abc".into()));
}

#[test]
fn test_overrides_win() {
    let t = from_text(
        "code,px\n001,1\n002,2\n",
        None,
        Some("{code: 'VARCHAR', px: 'DOUBLE'}"),
        false,
    )
    .unwrap();
    assert_eq!(t.types(), vec![SqlType::Text, SqlType::Float64]);
    assert_eq!(t.value(0, 0), Value::Text("001".into()));
}

#[test]
fn test_date_column_upgrade() {
    let t = from_text("date,px\n20240102,1.5\n20240103,2.5\n", None, None, false).unwrap();
    assert_eq!(t.types()[0], SqlType::Date);
    assert_eq!(
        t.value(0, 0),
        Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    );
}

#[test]
fn test_json_array_of_objects() {
    let t = from_text(
        r#"[{"sym": "A", "px": 1}, {"sym": "B", "px": 2.5, "note": "x"}]"#,
        None,
        None,
        false,
    )
    .unwrap();
    assert_eq!(t.names(), vec!["sym", "px", "note"]);
    assert_eq!(t.types(), vec![SqlType::Text, SqlType::Float64, SqlType::Text]);
    assert!(t.value(0, 2).is_null());
}

#[test]
fn test_json_path_narrowing() {
    let doc = r#"{"result": {"rows": [[1, "a"], [2, "b"]]}}"#;
    let t = from_text(doc, Some(".result.rows"), None, false).unwrap();
    assert_eq!(t.names(), vec!["c0", "c1"]);
    assert_eq!(t.value(1, 0), Value::Int(2));

    let t = from_text(doc, Some(".result.rows[][1]"), None, false).unwrap();
    assert_eq!(t.row_count(), 2);
    assert_eq!(t.value(0, 0), Value::Text("a".into()));
}

#[test]
fn test_json_path_selecting_null() {
    let err = from_text(r#"{"a": null}"#, Some(".a"), None, false).unwrap_err();
    assert!(matches!(err, IngestError::NullPath(_)));
}

#[test]
fn test_html_page() {
    let rows: String = (1..=4)
        .map(|i| format!("<tr><td>r{}</td><td>{}</td></tr>", i, i * 10))
        .collect();
    let page = format!(
        "<html><body><table class=\"infobox\"><tr><td>skip</td></tr></table>\
         <table><tr><th>name</th><th>value</th></tr>{}</table></body></html>",
        rows
    );
    assert_eq!(detect_format(&page, false), Format::Html);

    let t = from_text(&page, None, None, false).unwrap();
    assert_eq!(t.names(), vec!["name", "value"]);
    assert_eq!(t.row_count(), 4);
    assert_eq!(t.types()[1], SqlType::Int64);
}

#[test]
fn test_forced_delimited() {
    assert_eq!(detect_format("a {b}\r\n", false), Format::Json);
    assert_eq!(detect_format("a {b}\r\n", true), Format::Delimited);
}

#[test]
fn test_override_parsing() {
    let o = parse_overrides("{\"px\": 'DOUBLE', qty:INTEGER, note: 'WHATEVER'}");
    assert_eq!(o["px"], SqlType::Float64);
    assert_eq!(o["qty"], SqlType::Int32);
    assert_eq!(o["note"], SqlType::Text);
}
