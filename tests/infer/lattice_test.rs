//! Type lattice laws and token classification.

use babeldb::infer::convert::convert;
use babeldb::infer::{classify, classify_json, merge, merge_all, InferredType};
use babeldb::sql::SqlType;
use babeldb::Value;
use chrono::NaiveDate;
use serde_json::json;

use InferredType::*;

const ALL: [InferredType; 7] = [Null, Bool, Integer, Float, Date, Timestamp, Text];

#[test]
fn test_merge_is_commutative_and_idempotent() {
    for a in ALL {
        assert_eq!(merge(a, a), a);
        for b in ALL {
            assert_eq!(merge(a, b), merge(b, a), "{:?} / {:?}", a, b);
        }
    }
}

#[test]
fn test_merge_is_associative() {
    for a in ALL {
        for b in ALL {
            for c in ALL {
                assert_eq!(merge(merge(a, b), c), merge(a, merge(b, c)));
            }
        }
    }
}

#[test]
fn test_merge_never_narrows() {
    for a in ALL {
        assert_eq!(merge(Null, a), a);
        assert_eq!(merge(Text, a), Text);
    }
    assert_eq!(merge(Integer, Float), Float);
    assert_eq!(merge(Bool, Text), Text);
    assert_eq!(merge(Bool, Integer), Text);
    assert_eq!(merge(Date, Timestamp), Text);
}

#[test]
fn test_classify_examples() {
    assert_eq!(classify("20"), Integer);
    assert_eq!(classify("20.5"), Float);
    assert_eq!(classify(""), Null);
    assert_eq!(classify("  "), Null);
    assert_eq!(classify("-"), Null);
    assert_eq!(classify("2023-01-01"), Date);
    assert_eq!(classify("2023-01-01T10:00:00"), Timestamp);
}

#[test]
fn test_classify_numbers() {
    assert_eq!(classify("1,234"), Integer);
    assert_eq!(classify("1,234.50"), Float);
    assert_eq!(classify("3 million"), Integer);
    assert_eq!(classify("."), Float);
    assert_eq!(classify("-7"), Integer);
    assert_eq!(classify("2023"), Integer);
}

#[test]
fn test_classify_other_shapes() {
    assert_eq!(classify("TRUE"), Bool);
    assert_eq!(classify("false"), Bool);
    assert_eq!(classify("2023-Q2"), Date);
    assert_eq!(classify("2023-07"), Date);
    assert_eq!(classify("03/25/2024"), Date);
    assert_eq!(classify("25/03/2024"), Date);
    assert_eq!(classify("2023-13-01"), Text);
    assert_eq!(classify("AAPL"), Text);
}

#[test]
fn test_column_fold() {
    let column = ["1", "", "2.5", "-"];
    assert_eq!(merge_all(column.iter().map(|t| classify(t))), Float);

    let column = ["2024-01-01", "n/a"];
    assert_eq!(merge_all(column.iter().map(|t| classify(t))), Text);

    assert_eq!(merge_all(std::iter::empty()), Null);
    assert_eq!(Null.to_sql_type(), SqlType::Text);
}

#[test]
fn test_classify_json_kinds() {
    assert_eq!(classify_json(&json!(1)), Integer);
    assert_eq!(classify_json(&json!(1.0)), Float);
    assert_eq!(classify_json(&json!(true)), Bool);
    assert_eq!(classify_json(&json!(null)), Null);
    assert_eq!(classify_json(&json!("2024-02-03")), Date);
    assert_eq!(classify_json(&json!("x")), Text);
}

#[test]
fn test_conversion_degrades_to_null() {
    assert_eq!(convert("12", &SqlType::Int64), Value::Int(12));
    assert_eq!(convert("abc", &SqlType::Int64), Value::Null);
    assert!(matches!(convert("abc", &SqlType::Float64), Value::Float(f) if f.is_nan()));
    assert_eq!(convert("70000", &SqlType::Int16), Value::Null);
    assert_eq!(
        convert("2023-Q3", &SqlType::Date),
        Value::Date(NaiveDate::from_ymd_opt(2023, 7, 1).unwrap())
    );
    assert_eq!(
        convert("2024-01-02", &SqlType::Timestamp),
        Value::Timestamp(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap())
    );
}
