//! DML (Data Manipulation Language) support.
//!
//! A multi-row `INSERT INTO <table> VALUES (...), (...)` builder whose cells
//! are literal tokens.
//!
//! # Examples
//!
//! ```ignore
//! use babeldb::sql::dml::Insert;
//! use babeldb::sql::token::Token;
//!
//! let insert = Insert::into("temptbl0")
//!     .values(vec![Token::LitInt(1), Token::LitString("Alice".into())]);
//! ```

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

/// INSERT statement.
#[derive(Debug, Clone)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql()"]
pub struct Insert {
    pub table: String,
    pub values: Vec<Vec<Token>>,
}

impl Insert {
    /// Create a new INSERT statement.
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Add a row of literal values.
    pub fn values(mut self, row: impl IntoIterator<Item = Token>) -> Self {
        self.values.push(row.into_iter().collect());
        self
    }

    /// Add multiple rows of values.
    pub fn values_many(mut self, rows: impl IntoIterator<Item = Vec<Token>>) -> Self {
        self.values.extend(rows);
        self
    }

    /// True when there are no rows to insert.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .push(Token::TableName(self.table.clone()))
            .space()
            .push(Token::Values)
            .space();

        for (i, row) in self.values.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.lparen();
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    ts.comma().space();
                }
                ts.push(val.clone());
            }
            ts.rparen();
        }

        ts
    }
}
