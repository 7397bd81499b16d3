//! Pseudo-function argument lists.
//!
//! Parses the `( ... )` that follows a pseudo-function name into argument
//! strings plus the text after the closing parenthesis. Arguments are
//! separated by `,` and come in four shapes:
//!
//! | Opens with | Ends at                | Kept as                      |
//! |------------|------------------------|------------------------------|
//! | `'` / `"`  | matching quote         | contents, quotes removed     |
//! | `(`        | balancing `)`          | text including parentheses   |
//! | `{`        | balancing `}`          | contents, braces removed     |
//! | other      | next `,` or `)`        | trimmed text                 |
//!
//! A terminator directly preceded by `\` does not close its span; the
//! backslash stays in the argument.

use thiserror::Error;

/// Errors from argument-list parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgParseError {
    #[error("argument list must start with ( and contain ): {0}")]
    Malformed(String),

    #[error("ending {terminator} not found in: {fragment}")]
    Unterminated { terminator: char, fragment: String },
}

/// A parsed argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub args: Vec<String>,
    /// Text following the closing `)`.
    pub remainder: String,
}

/// Parse an argument list starting at the first non-blank character of
/// `text`.
pub fn parse_args(text: &str) -> Result<ParsedArgs, ArgParseError> {
    if !text.trim_start().starts_with('(') || !text.contains(')') {
        return Err(ArgParseError::Malformed(text.to_string()));
    }

    let mut cursor = Cursor::new(text);
    cursor.skip_whitespace();
    cursor.bump(); // '('
    cursor.skip_whitespace();

    let mut args = Vec::new();
    while let Some(c) = cursor.peek() {
        if c == ')' {
            break;
        }
        args.push(cursor.read_arg()?);
        cursor.skip_whitespace();
        if cursor.peek() != Some(',') {
            break;
        }
        cursor.bump();
        cursor.skip_whitespace();
    }

    if cursor.peek() != Some(')') {
        return Err(ArgParseError::Malformed(text.to_string()));
    }
    cursor.bump();

    Ok(ParsedArgs {
        args,
        remainder: cursor.rest(),
    })
}

struct Cursor<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn rest(&self) -> String {
        self.chars[self.pos.min(self.chars.len())..].iter().collect()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn escaped(&self, at: usize) -> bool {
        at > 0 && self.chars[at - 1] == '\\'
    }

    fn unterminated(&self, terminator: char) -> ArgParseError {
        ArgParseError::Unterminated {
            terminator,
            fragment: self.src.to_string(),
        }
    }

    fn read_arg(&mut self) -> Result<String, ArgParseError> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                let start = self.pos + 1;
                let end = self.find_quote_end(start, q)?;
                self.pos = end + 1;
                Ok(self.slice(start, end))
            }
            Some('(') => {
                let start = self.pos;
                let end = self.find_balanced_end(start, '(', ')')?;
                self.pos = end + 1;
                Ok(self.slice(start, end + 1))
            }
            Some('{') => {
                let start = self.pos;
                let end = self.find_balanced_end(start, '{', '}')?;
                self.pos = end + 1;
                Ok(self.slice(start + 1, end))
            }
            _ => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ',' && c != ')') {
                    self.pos += 1;
                }
                Ok(self.slice(start, self.pos).trim().to_string())
            }
        }
    }

    /// Index of the unescaped `quote` at or after `from`.
    fn find_quote_end(&self, from: usize, quote: char) -> Result<usize, ArgParseError> {
        (from..self.chars.len())
            .find(|&i| self.chars[i] == quote && !self.escaped(i))
            .ok_or_else(|| self.unterminated(quote))
    }

    /// Index of the `close` that balances the `open` at `start`. Quoted
    /// text inside the span is skipped.
    fn find_balanced_end(&self, start: usize, open: char, close: char) -> Result<usize, ArgParseError> {
        let mut depth = 0usize;
        let mut i = start;
        while i < self.chars.len() {
            let c = self.chars[i];
            if self.escaped(i) {
                i += 1;
                continue;
            }
            if (c == '\'' || c == '"') && i > start {
                i = self.find_quote_end(i + 1, c)? + 1;
                continue;
            }
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            i += 1;
        }
        Err(self.unterminated(close))
    }
}
