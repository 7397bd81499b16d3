//! Typed column storage.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::Value;
use crate::infer::convert::fits_integer;
use crate::sql::types::SqlType;

/// Backing storage of one column, tagged by physical type.
///
/// Float columns use NaN as their null marker; every other variant stores
/// `Option`s.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Bool(Vec<Option<bool>>),
    Int16(Vec<Option<i16>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Date(Vec<Option<NaiveDate>>),
    Time(Vec<Option<NaiveTime>>),
    Timestamp(Vec<Option<NaiveDateTime>>),
    Uuid(Vec<Option<Uuid>>),
    Array {
        element: SqlType,
        values: Vec<Option<Vec<Value>>>,
    },
}

impl ColumnData {
    /// Allocate a column of `len` nulls.
    pub fn allocate(sql_type: &SqlType, len: usize) -> Self {
        match sql_type {
            SqlType::Text => ColumnData::Text(vec![None; len]),
            SqlType::Bool => ColumnData::Bool(vec![None; len]),
            SqlType::Int16 => ColumnData::Int16(vec![None; len]),
            SqlType::Int32 => ColumnData::Int32(vec![None; len]),
            SqlType::Int64 => ColumnData::Int64(vec![None; len]),
            SqlType::Float32 => ColumnData::Float32(vec![f32::NAN; len]),
            SqlType::Float64 => ColumnData::Float64(vec![f64::NAN; len]),
            SqlType::Date => ColumnData::Date(vec![None; len]),
            SqlType::Time => ColumnData::Time(vec![None; len]),
            SqlType::Timestamp => ColumnData::Timestamp(vec![None; len]),
            SqlType::Uuid => ColumnData::Uuid(vec![None; len]),
            SqlType::Array(elem) => ColumnData::Array {
                element: (**elem).clone(),
                values: vec![None; len],
            },
        }
    }

    /// Build a column of the given type, casting every value into it.
    pub fn from_values(sql_type: &SqlType, values: impl IntoIterator<Item = Value>) -> Self {
        let values: Vec<Value> = values.into_iter().collect();
        let mut data = ColumnData::allocate(sql_type, values.len());
        for (row, value) in values.into_iter().enumerate() {
            data.set(row, value);
        }
        data
    }

    /// Text column from optional strings.
    pub fn text<S: Into<String>>(values: impl IntoIterator<Item = Option<S>>) -> Self {
        ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Time(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::Uuid(v) => v.len(),
            ColumnData::Array { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            ColumnData::Text(_) => SqlType::Text,
            ColumnData::Bool(_) => SqlType::Bool,
            ColumnData::Int16(_) => SqlType::Int16,
            ColumnData::Int32(_) => SqlType::Int32,
            ColumnData::Int64(_) => SqlType::Int64,
            ColumnData::Float32(_) => SqlType::Float32,
            ColumnData::Float64(_) => SqlType::Float64,
            ColumnData::Date(_) => SqlType::Date,
            ColumnData::Time(_) => SqlType::Time,
            ColumnData::Timestamp(_) => SqlType::Timestamp,
            ColumnData::Uuid(_) => SqlType::Uuid,
            ColumnData::Array { element, .. } => SqlType::Array(Box::new(element.clone())),
        }
    }

    /// Read one cell. Out-of-range rows read as `Null`.
    pub fn get(&self, row: usize) -> Value {
        fn opt<T: Clone>(v: &[Option<T>], row: usize, f: impl FnOnce(T) -> Value) -> Value {
            v.get(row).cloned().flatten().map(f).unwrap_or(Value::Null)
        }

        match self {
            ColumnData::Text(v) => opt(v, row, Value::Text),
            ColumnData::Bool(v) => opt(v, row, Value::Bool),
            ColumnData::Int16(v) => opt(v, row, |n| Value::Int(i64::from(n))),
            ColumnData::Int32(v) => opt(v, row, |n| Value::Int(i64::from(n))),
            ColumnData::Int64(v) => opt(v, row, Value::Int),
            ColumnData::Float32(v) => match v.get(row) {
                Some(f) if !f.is_nan() => Value::Float(f64::from(*f)),
                _ => Value::Null,
            },
            ColumnData::Float64(v) => match v.get(row) {
                Some(f) if !f.is_nan() => Value::Float(*f),
                _ => Value::Null,
            },
            ColumnData::Date(v) => opt(v, row, Value::Date),
            ColumnData::Time(v) => opt(v, row, Value::Time),
            ColumnData::Timestamp(v) => opt(v, row, Value::Timestamp),
            ColumnData::Uuid(v) => opt(v, row, Value::Uuid),
            ColumnData::Array { values, .. } => opt(values, row, Value::Array),
        }
    }

    /// Write one cell, casting the value into the column type first.
    ///
    /// Writes past the end are ignored. A value that does not survive the
    /// cast is stored as null. An integer too wide for a `SMALLINT` or
    /// `INTEGER` column widens the whole column to `BIGINT`.
    pub fn set(&mut self, row: usize, value: Value) {
        if row >= self.len() {
            return;
        }
        let target = self.sql_type();
        let value = if value_matches(&value, &target) {
            value
        } else {
            value.cast(&target)
        };
        if let Value::Int(n) = &value {
            if !fits_integer(*n, &target) {
                *self = self.cast(&SqlType::Int64);
            }
        }

        match (self, value) {
            (ColumnData::Text(v), Value::Text(s)) => v[row] = Some(s),
            (ColumnData::Bool(v), Value::Bool(b)) => v[row] = Some(b),
            (ColumnData::Int16(v), Value::Int(n)) => v[row] = i16::try_from(n).ok(),
            (ColumnData::Int32(v), Value::Int(n)) => v[row] = i32::try_from(n).ok(),
            (ColumnData::Int64(v), Value::Int(n)) => v[row] = Some(n),
            (ColumnData::Float32(v), Value::Float(f)) => v[row] = f as f32,
            (ColumnData::Float64(v), Value::Float(f)) => v[row] = f,
            (ColumnData::Date(v), Value::Date(d)) => v[row] = Some(d),
            (ColumnData::Time(v), Value::Time(t)) => v[row] = Some(t),
            (ColumnData::Timestamp(v), Value::Timestamp(ts)) => v[row] = Some(ts),
            (ColumnData::Uuid(v), Value::Uuid(u)) => v[row] = Some(u),
            (ColumnData::Array { values, .. }, Value::Array(items)) => values[row] = Some(items),
            (data, _) => data.set_null(row),
        }
    }

    fn set_null(&mut self, row: usize) {
        match self {
            ColumnData::Text(v) => v[row] = None,
            ColumnData::Bool(v) => v[row] = None,
            ColumnData::Int16(v) => v[row] = None,
            ColumnData::Int32(v) => v[row] = None,
            ColumnData::Int64(v) => v[row] = None,
            ColumnData::Float32(v) => v[row] = f32::NAN,
            ColumnData::Float64(v) => v[row] = f64::NAN,
            ColumnData::Date(v) => v[row] = None,
            ColumnData::Time(v) => v[row] = None,
            ColumnData::Timestamp(v) => v[row] = None,
            ColumnData::Uuid(v) => v[row] = None,
            ColumnData::Array { values, .. } => values[row] = None,
        }
    }

    /// Number of non-null cells.
    pub fn non_null_count(&self) -> usize {
        (0..self.len()).filter(|&row| !self.get(row).is_null()).count()
    }

    /// First non-null cell, if any.
    pub fn first_non_null(&self) -> Option<Value> {
        (0..self.len())
            .map(|row| self.get(row))
            .find(|v| !v.is_null())
    }

    /// Iterate over all cells as values.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |row| self.get(row))
    }

    /// Re-encode this column as another type.
    pub fn cast(&self, target: &SqlType) -> ColumnData {
        if self.sql_type() == *target {
            return self.clone();
        }
        ColumnData::from_values(target, self.values().map(|v| v.cast(target)))
    }
}

fn value_matches(value: &Value, target: &SqlType) -> bool {
    matches!(
        (value, target),
        (Value::Null, _)
            | (Value::Text(_), SqlType::Text)
            | (Value::Bool(_), SqlType::Bool)
            | (Value::Int(_), SqlType::Int16 | SqlType::Int32 | SqlType::Int64)
            | (Value::Float(_), SqlType::Float32 | SqlType::Float64)
            | (Value::Date(_), SqlType::Date)
            | (Value::Time(_), SqlType::Time)
            | (Value::Timestamp(_), SqlType::Timestamp)
            | (Value::Uuid(_), SqlType::Uuid)
            | (Value::Array(_), SqlType::Array(_))
    )
}

impl PartialEq for ColumnData {
    /// Cell-wise equality where two NaN float cells compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.sql_type() == other.sql_type()
            && self.len() == other.len()
            && self.values().zip(other.values()).all(|(a, b)| match (&a, &b) {
                (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
                (Value::Array(xs), Value::Array(ys)) => {
                    xs.len() == ys.len()
                        && xs.iter().zip(ys).all(|(x, y)| x == y || (x.is_null() && y.is_null()))
                }
                _ => a == b,
            })
    }
}

/// A named column. Data is shared between tables produced by projection
/// and renaming.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    pub name: String,
    pub data: Arc<ColumnData>,
}

impl TypedColumn {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data: Arc::new(data),
        }
    }

    pub fn sql_type(&self) -> SqlType {
        self.data.sql_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize) -> Value {
        self.data.get(row)
    }
}
