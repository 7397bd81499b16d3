//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::dialect::{Dialect, SqlDialect};
use super::types::SqlType;
use crate::table::Value;

/// SQL Token - every element of a materialization script.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Transaction Keywords ===
    Begin,
    Transaction,
    Commit,
    Rollback,

    // === DDL Keywords ===
    Create,
    Drop,
    Table,
    If,
    Exists,

    // === DML Keywords ===
    Insert,
    Into,
    Values,

    // === Punctuation ===
    Comma,
    LParen,
    RParen,
    Semicolon,

    // === Whitespace / Formatting ===
    Space,
    Newline,

    // === Dynamic Content ===
    /// Quoted identifier (column name)
    Ident(String),
    /// Unquoted table name; temporary-table aliases are written as given
    TableName(String),
    /// Column type name in a table definition
    TypeName(String),
    /// Integer literal
    LitInt(i64),
    /// Float literal; NaN and infinities render as NULL
    LitFloat(f64),
    /// String literal
    LitString(String),
    /// Boolean literal
    LitBool(bool),
    /// NULL literal
    LitNull,
    /// Date literal, quoted `yyyy-MM-dd`
    LitDate(NaiveDate),
    /// Time literal, quoted
    LitTime(NaiveTime),
    /// Timestamp literal, quoted in the dialect's timestamp form
    LitTimestamp(NaiveDateTime),
    /// UUID literal, quoted
    LitUuid(Uuid),
    /// Array literal of the given element type
    LitArray {
        element: SqlType,
        items: Vec<Value>,
    },
}

impl Token {
    /// Literal token for a cell of a column of type `column_type`.
    ///
    /// Arrays of text are flattened into a single string literal of the
    /// form `[a, b, null]`.
    pub fn literal(value: &Value, column_type: &SqlType) -> Token {
        match value {
            v if v.is_null() => Token::LitNull,
            Value::Null => Token::LitNull,
            Value::Text(s) => Token::LitString(s.clone()),
            Value::Bool(b) => Token::LitBool(*b),
            Value::Int(n) => Token::LitInt(*n),
            Value::Float(f) => Token::LitFloat(*f),
            Value::Date(d) => Token::LitDate(*d),
            Value::Time(t) => Token::LitTime(*t),
            Value::Timestamp(ts) => Token::LitTimestamp(*ts),
            Value::Uuid(u) => Token::LitUuid(*u),
            Value::Array(items) => match column_type.element_type() {
                Some(SqlType::Text) | None => Token::LitString(text_array(items)),
                Some(elem) => Token::LitArray {
                    element: elem.clone(),
                    items: items.clone(),
                },
            },
        }
    }

    /// Serialize this token to a string for the given dialect.
    pub fn serialize(&self, dialect: Dialect) -> String {
        match self {
            // Keywords
            Token::Begin => "BEGIN".into(),
            Token::Transaction => "TRANSACTION".into(),
            Token::Commit => "COMMIT".into(),
            Token::Rollback => "ROLLBACK".into(),
            Token::Create => "CREATE".into(),
            Token::Drop => "DROP".into(),
            Token::Table => "TABLE".into(),
            Token::If => "IF".into(),
            Token::Exists => "EXISTS".into(),
            Token::Insert => "INSERT".into(),
            Token::Into => "INTO".into(),
            Token::Values => "VALUES".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Semicolon => ";".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::TableName(name) => name.clone(),
            Token::TypeName(name) => name.clone(),
            Token::LitInt(n) => n.to_string(),
            Token::LitFloat(f) => format_float(*f, dialect),
            Token::LitString(s) => dialect.quote_string(s),
            Token::LitBool(b) => dialect.format_bool(*b).into(),
            Token::LitNull => dialect.format_null().into(),
            Token::LitDate(d) => dialect.quote_string(&d.format("%Y-%m-%d").to_string()),
            Token::LitTime(t) => dialect.quote_string(&dialect.format_time(t)),
            Token::LitTimestamp(ts) => dialect.quote_string(&dialect.format_timestamp(ts)),
            Token::LitUuid(u) => dialect.quote_string(&u.to_string()),
            Token::LitArray { element, items } => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| array_item(item, element, dialect))
                    .collect();
                dialect.array_literal(&rendered)
            }
        }
    }
}

fn text_array(items: &[Value]) -> String {
    let cells: Vec<String> = items
        .iter()
        .map(|v| if v.is_null() { "null".to_string() } else { v.to_string() })
        .collect();
    format!("[{}]", cells.join(", "))
}

fn format_float(f: f64, dialect: Dialect) -> String {
    if !f.is_finite() {
        return dialect.format_null().into();
    }
    // Use ryu for fast, accurate float formatting
    let mut buffer = ryu::Buffer::new();
    buffer.format(f).to_string()
}

/// Array elements are quoted strings except booleans and nulls; float
/// elements may carry a dialect cast.
fn array_item(item: &Value, element: &SqlType, dialect: Dialect) -> String {
    match item {
        v if v.is_null() => dialect.format_null().into(),
        Value::Bool(b) => b.to_string(),
        Value::Date(d) => dialect.quote_string(&d.format("%Y-%m-%d").to_string()),
        Value::Timestamp(ts) => dialect.quote_string(&dialect.format_timestamp(ts)),
        other => {
            let quoted = dialect.quote_string(&other.to_string());
            match dialect.array_element_cast(element) {
                Some(cast) if matches!(other, Value::Float(_)) => format!("{}{}", quoted, cast),
                _ => quoted,
            }
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self, dialect: Dialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
    pub fn semicolon(&mut self) -> &mut Self {
        self.push(Token::Semicolon)
    }
}
