//! Scalar cell values.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::infer::convert;
use crate::sql::types::SqlType;

/// A single cell read out of, or written into, a column.
///
/// `Float(NaN)` is the null marker of float columns and is treated as null
/// everywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Array(Vec<Value>),
}

impl Value {
    /// True for `Null` and for NaN floats.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) if !f.is_nan() => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Convert this value to another column type.
    ///
    /// Conversions are best effort: anything that has no sensible image in
    /// the target type becomes `Null`. Integers cast to temporal types are
    /// read as epoch seconds or milliseconds depending on magnitude.
    pub fn cast(&self, target: &SqlType) -> Value {
        if self.is_null() {
            return Value::Null;
        }

        match (self, target) {
            (Value::Text(s), t) => convert::convert(s, t),
            (v, SqlType::Text) => Value::Text(v.to_string()),

            (Value::Int(n), t) if t.is_integer() => int_value(*n, t),
            (Value::Int(n), t) if t.is_float() => Value::Float(*n as f64),
            (Value::Int(n), SqlType::Bool) => Value::Bool(*n != 0),
            (Value::Int(n), SqlType::Timestamp) => convert::epoch_timestamp(*n),
            (Value::Int(n), SqlType::Date) => convert::epoch_date(*n),

            (Value::Float(f), t) if t.is_float() => Value::Float(*f),
            (Value::Float(f), t) if t.is_integer() && f.is_finite() => {
                int_value(f.trunc() as i64, t)
            }
            (Value::Float(f), SqlType::Bool) => Value::Bool(*f != 0.0),
            (Value::Float(f), SqlType::Timestamp) if f.is_finite() => {
                convert::epoch_timestamp(*f as i64)
            }
            (Value::Float(f), SqlType::Date) if f.is_finite() => convert::epoch_date(*f as i64),

            (Value::Bool(b), SqlType::Bool) => Value::Bool(*b),
            (Value::Bool(b), t) if t.is_integer() => Value::Int(i64::from(*b)),
            (Value::Bool(b), t) if t.is_float() => Value::Float(if *b { 1.0 } else { 0.0 }),

            (Value::Date(d), SqlType::Date) => Value::Date(*d),
            (Value::Date(d), SqlType::Timestamp) => d
                .and_hms_opt(0, 0, 0)
                .map(Value::Timestamp)
                .unwrap_or(Value::Null),
            (Value::Timestamp(ts), SqlType::Timestamp) => Value::Timestamp(*ts),
            (Value::Timestamp(ts), SqlType::Date) => Value::Date(ts.date()),
            (Value::Timestamp(ts), SqlType::Time) => Value::Time(ts.time()),
            (Value::Time(t), SqlType::Time) => Value::Time(*t),

            (Value::Uuid(u), SqlType::Uuid) => Value::Uuid(*u),

            (Value::Array(items), SqlType::Array(elem)) => {
                Value::Array(items.iter().map(|v| v.cast(elem)).collect())
            }

            _ => Value::Null,
        }
    }
}

fn int_value(n: i64, target: &SqlType) -> Value {
    if convert::fits_integer(n, target) {
        Value::Int(n)
    } else {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) if x.is_nan() => Ok(()),
            Value::Float(x) => {
                let mut buffer = ryu::Buffer::new();
                write!(f, "{}", buffer.format(*x))
            }
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
