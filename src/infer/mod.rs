//! Column type inference.
//!
//! Each raw token is classified into an [`InferredType`]; a column's type is
//! the [`merge`] of the classifications of all of its tokens. The lattice is
//! small and flat:
//!
//! ```text
//!              Text
//!   /    |     |     \      \
//! Bool  Float  Date  Timestamp
//!         |
//!      Integer
//!
//!   (Null sits below everything)
//! ```
//!
//! `merge` is commutative, associative and idempotent, so folding a column
//! in any order yields the same result.

pub mod convert;

use serde::Serialize;

use crate::sql::types::SqlType;

/// Inferred type of a token or a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InferredType {
    Null,
    Bool,
    Integer,
    Float,
    Date,
    Timestamp,
    Text,
}

impl InferredType {
    /// Physical column type used to materialize a column of this type.
    ///
    /// A column that saw nothing but nulls is stored as text.
    pub fn to_sql_type(self) -> SqlType {
        match self {
            InferredType::Null | InferredType::Text => SqlType::Text,
            InferredType::Bool => SqlType::Bool,
            InferredType::Integer => SqlType::Int64,
            InferredType::Float => SqlType::Float64,
            InferredType::Date => SqlType::Date,
            InferredType::Timestamp => SqlType::Timestamp,
        }
    }
}

/// Least upper bound of two inferred types.
pub fn merge(a: InferredType, b: InferredType) -> InferredType {
    use InferredType::*;

    match (a, b) {
        (x, y) if x == y => x,
        (Null, x) | (x, Null) => x,
        (Integer, Float) | (Float, Integer) => Float,
        _ => Text,
    }
}

/// Fold a sequence of inferred types with [`merge`], starting from `Null`.
pub fn merge_all(types: impl IntoIterator<Item = InferredType>) -> InferredType {
    types.into_iter().fold(InferredType::Null, merge)
}

/// Placeholder spellings that mean "no value".
const NULL_TOKENS: &[&str] = &["-", "--", "\u{2013}", "\u{2013}\u{2013}"];

/// Classify a single text token.
pub fn classify(token: &str) -> InferredType {
    let t = token.trim();
    if t.is_empty() || NULL_TOKENS.contains(&t) {
        return InferredType::Null;
    }

    if t == "." {
        return InferredType::Float;
    }
    if convert::parse_number(t).is_some() {
        // Exponent notation is a float even when integral, so "1e5" never
        // lands in an integer column that would reject it.
        return if t.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
            InferredType::Float
        } else {
            InferredType::Integer
        };
    }

    if t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("false") {
        return InferredType::Bool;
    }

    if looks_like_date(t) {
        if t.len() > 10 {
            if convert::parse_timestamp(t).is_some() {
                return InferredType::Timestamp;
            }
        } else if convert::parse_date(t).is_some() {
            return InferredType::Date;
        }
    }

    InferredType::Text
}

fn looks_like_date(t: &str) -> bool {
    convert::has_iso_date_prefix(t)
        || convert::is_year_period(t)
        || convert::is_year(t)
        || convert::parse_slash_date(t).is_some()
}

/// Classify a JSON value by its JSON kind; strings are classified by content.
pub fn classify_json(value: &serde_json::Value) -> InferredType {
    match value {
        serde_json::Value::Null => InferredType::Null,
        serde_json::Value::Bool(_) => InferredType::Bool,
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                InferredType::Integer
            } else {
                InferredType::Float
            }
        }
        serde_json::Value::String(s) => classify(s),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => InferredType::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use InferredType::*;

    const ALL: [InferredType; 7] = [Null, Bool, Integer, Float, Date, Timestamp, Text];

    #[test]
    fn test_merge_laws() {
        for a in ALL {
            assert_eq!(merge(a, a), a);
            assert_eq!(merge(Null, a), a);
            for b in ALL {
                assert_eq!(merge(a, b), merge(b, a));
                for c in ALL {
                    assert_eq!(merge(merge(a, b), c), merge(a, merge(b, c)));
                }
            }
        }
    }

    #[test]
    fn test_merge_widening() {
        assert_eq!(merge(Integer, Float), Float);
        assert_eq!(merge(Date, Timestamp), Text);
        assert_eq!(merge(Bool, Integer), Text);
        assert_eq!(merge_all([Null, Integer, Null, Float]), Float);
        assert_eq!(merge_all([]), Null);
    }

    #[test]
    fn test_classify_null_placeholders() {
        assert_eq!(classify(""), Null);
        assert_eq!(classify("   "), Null);
        assert_eq!(classify("-"), Null);
        assert_eq!(classify("--"), Null);
        assert_eq!(classify("\u{2013}"), Null);
    }

    #[test]
    fn test_classify_numbers() {
        assert_eq!(classify("42"), Integer);
        assert_eq!(classify("-7"), Integer);
        assert_eq!(classify("1,234"), Integer);
        assert_eq!(classify("3.14"), Float);
        assert_eq!(classify("."), Float);
        assert_eq!(classify("2 million"), Integer);
        assert_eq!(classify("1e5"), Float);
        assert_eq!(classify("Infinity"), Text);
    }

    #[test]
    fn test_exponent_tokens_are_floats() {
        assert_eq!(classify("1e5"), Float);
        assert_eq!(classify("2E-3"), Float);
        assert_eq!(merge_all(["7", "1e5"].map(classify)), Float);

        let target = merge_all(["1e5", "2E-3"].map(classify)).to_sql_type();
        assert_eq!(convert::convert("1e5", &target), Value::Float(100000.0));
        assert_eq!(convert::convert("2E-3", &target), Value::Float(0.002));
    }

    #[test]
    fn test_classify_bool() {
        assert_eq!(classify("TRUE"), Bool);
        assert_eq!(classify("false"), Bool);
    }

    #[test]
    fn test_classify_dates() {
        assert_eq!(classify("2021-05-17"), Date);
        assert_eq!(classify("2021-05"), Date);
        assert_eq!(classify("2021-Q2"), Date);
        assert_eq!(classify("25/12/2020"), Date);
        assert_eq!(classify("2023-09-12T20:14:02Z"), Timestamp);
        assert_eq!(classify("2023-09-12 20:14:02"), Timestamp);
        assert_eq!(classify("2021-02-30"), Text);
    }

    #[test]
    fn test_classify_years_are_integers() {
        // Numeric parsing wins over the bare-year date shape.
        assert_eq!(classify("2020"), Integer);
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify("hello"), Text);
        assert_eq!(classify("AAPL"), Text);
    }

    #[test]
    fn test_classify_json() {
        use serde_json::json;

        assert_eq!(classify_json(&json!(null)), Null);
        assert_eq!(classify_json(&json!(1)), Integer);
        assert_eq!(classify_json(&json!(1.5)), Float);
        assert_eq!(classify_json(&json!(true)), Bool);
        assert_eq!(classify_json(&json!("2021-01-01")), Date);
        assert_eq!(classify_json(&json!({"a": 1})), Null);
    }

    #[test]
    fn test_to_sql_type() {
        assert_eq!(Null.to_sql_type(), SqlType::Text);
        assert_eq!(Integer.to_sql_type(), SqlType::Int64);
        assert_eq!(Float.to_sql_type(), SqlType::Float64);
        assert_eq!(Timestamp.to_sql_type(), SqlType::Timestamp);
    }
}
