//! Column types for materialized tables.
//!
//! `SqlType` is the closed set of physical column types a `ColumnarTable`
//! can carry. Each variant maps to one generic SQL type name; arrays carry
//! their element type.
//!
//! # Examples
//!
//! ```ignore
//! use babeldb::sql::types::SqlType;
//!
//! assert_eq!(SqlType::parse("bigint"), Some(SqlType::Int64));
//! assert_eq!(SqlType::parse("double[]"), Some(SqlType::Array(Box::new(SqlType::Float64))));
//! ```

use std::fmt;

/// Physical column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// Variable-length string.
    Text,

    /// Boolean.
    Bool,

    /// 16-bit signed integer (SMALLINT).
    Int16,

    /// 32-bit signed integer (INTEGER).
    Int32,

    /// 64-bit signed integer (BIGINT).
    Int64,

    /// 32-bit floating point (REAL).
    Float32,

    /// 64-bit floating point (DOUBLE).
    Float64,

    /// Calendar date without time.
    Date,

    /// Time of day without date or timezone.
    Time,

    /// Timestamp without timezone.
    Timestamp,

    /// UUID.
    Uuid,

    /// Array of a scalar element type.
    Array(Box<SqlType>),
}

impl SqlType {
    /// Parse a type name as written in a type-override list or a column
    /// declaration reported by a backing engine.
    ///
    /// Accepts the common SQL spellings (`varchar`, `int`, `double precision`,
    /// `timestamp`, ...) plus `x[]` and `x array` for arrays. Length and
    /// precision parameters are ignored: `varchar(255)` is `Text`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();

        if let Some(elem) = s.strip_suffix("[]") {
            return SqlType::parse(elem).map(|t| SqlType::Array(Box::new(t)));
        }
        if let Some(elem) = s.strip_suffix(" array") {
            return SqlType::parse(elem).map(|t| SqlType::Array(Box::new(t)));
        }

        let base = match s.find('(') {
            Some(p) if s.ends_with(')') => s[..p].trim(),
            Some(_) => return None,
            None => s.as_str(),
        };

        match base {
            "bool" | "boolean" | "bit" => Some(SqlType::Bool),

            "smallint" | "int16" | "int2" | "tinyint" => Some(SqlType::Int16),
            "int" | "integer" | "int32" | "int4" => Some(SqlType::Int32),
            "bigint" | "int64" | "int8" | "long" => Some(SqlType::Int64),

            "real" | "float4" | "float32" => Some(SqlType::Float32),
            "double" | "float8" | "float64" | "double precision" | "float" | "decimal"
            | "numeric" | "number" => Some(SqlType::Float64),

            "text" | "string" | "clob" | "varchar" | "char" | "character"
            | "character varying" | "nvarchar" => Some(SqlType::Text),

            "date" => Some(SqlType::Date),
            "time" => Some(SqlType::Time),
            "timestamp" | "datetime" | "datetime2" => Some(SqlType::Timestamp),

            "uuid" | "guid" | "uniqueidentifier" => Some(SqlType::Uuid),

            _ => None,
        }
    }

    /// Returns true if this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Returns true if this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, SqlType::Int16 | SqlType::Int32 | SqlType::Int64)
    }

    /// Returns true if this is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, SqlType::Float32 | SqlType::Float64)
    }

    /// Returns true if this is a temporal (date/time) type.
    pub fn is_temporal(&self) -> bool {
        matches!(self, SqlType::Date | SqlType::Time | SqlType::Timestamp)
    }

    /// Element type of an array, `None` for scalars.
    pub fn element_type(&self) -> Option<&SqlType> {
        match self {
            SqlType::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Text => write!(f, "VARCHAR"),
            SqlType::Bool => write!(f, "BOOLEAN"),
            SqlType::Int16 => write!(f, "SMALLINT"),
            SqlType::Int32 => write!(f, "INTEGER"),
            SqlType::Int64 => write!(f, "BIGINT"),
            SqlType::Float32 => write!(f, "REAL"),
            SqlType::Float64 => write!(f, "DOUBLE"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time => write!(f, "TIME"),
            SqlType::Timestamp => write!(f, "TIMESTAMP"),
            SqlType::Uuid => write!(f, "UUID"),
            SqlType::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}
