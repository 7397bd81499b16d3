//! Query rewriting.
//!
//! [`translate`] turns a user query into a plan: a list of [`Command`]s, each
//! of which materializes a temporary table, plus the rewritten SQL that reads
//! from those tables.
//!
//! ```text
//! SELECT * FROM S_AAPL JOIN QUERY_WEB('https://x/a.csv') USING (date)
//!                      │
//!                      ▼
//! SELECT * FROM AAPL JOIN temptbl1 USING (date)
//!   + sym("AAPL")                        -> AAPL
//!   + web("https://x/a.csv")             -> temptbl1
//! ```
//!
//! Two passes run in order. The first replaces `FROM S_<symbol>` with the
//! symbol's alias. The second expands `QUERY_<name>(...)` pseudo-functions;
//! `QUERY_SYM(a, b)` expands in place to the aliases `a, b`, every other
//! name becomes a single `temptbl<n>` reference.

pub mod args;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{BabelError, BabelResult};

/// Prefix of generated temporary-table aliases.
pub const TEMP_TABLE_PREFIX: &str = "temptbl";

/// Marker that introduces a pseudo-function call.
pub const PSEUDO_FUNCTION_MARKER: &str = "QUERY_";

/// Prefix that marks a symbol reference after `FROM`.
pub const SYMBOL_TABLE_PREFIX: &str = "S_";

static BARE_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w:.\-]+$").expect("bare symbol pattern is valid"));

/// The closed set of command kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Fetch a URL and ingest the payload.
    Web,
    /// Ingest inline data.
    Data,
    /// Resolve a symbol through the registry.
    Sym,
    /// Search the registry.
    Symbols,
    /// Run a query against a named destination.
    Db,
}

impl CommandKind {
    /// Look up a command by its (lower-case) name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "web" => Some(CommandKind::Web),
            "data" => Some(CommandKind::Data),
            "sym" => Some(CommandKind::Sym),
            "symbols" => Some(CommandKind::Symbols),
            "db" => Some(CommandKind::Db),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Web => "web",
            CommandKind::Data => "data",
            CommandKind::Sym => "sym",
            CommandKind::Symbols => "symbols",
            CommandKind::Db => "db",
        }
    }
}

/// One unit of work: produce a table and register it under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub alias: String,
    /// Lower-cased command name as written in the query.
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(alias: impl Into<String>, name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            alias: alias.into(),
            name: name.into(),
            args,
        }
    }

    /// Resolve the command name. Unknown names are rejected here rather than
    /// during translation.
    pub fn kind(&self) -> BabelResult<CommandKind> {
        CommandKind::from_name(&self.name)
            .ok_or_else(|| BabelError::UnsupportedCommand(self.name.clone()))
    }
}

/// The result of rewriting a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTranslation {
    pub original_query: String,
    /// SQL to run once every command has materialized. `None` for empty
    /// input; empty for whole-query shortcuts.
    pub rewritten_query: Option<String>,
    pub commands: Vec<Command>,
}

impl QueryTranslation {
    fn unchanged(original: &str) -> Self {
        Self {
            original_query: original.to_string(),
            rewritten_query: None,
            commands: Vec::new(),
        }
    }

    fn single(original: &str, command: Command) -> Self {
        Self {
            original_query: original.to_string(),
            rewritten_query: Some(String::new()),
            commands: vec![command],
        }
    }

    /// The command whose table is the whole answer, when the rewritten query
    /// would do nothing but read it back.
    pub fn bypass_command(&self) -> Option<&Command> {
        match self.commands.as_slice() {
            [only] => match &self.rewritten_query {
                None => Some(only),
                Some(q) if q.trim() == only.alias => Some(only),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Rewrite a query into commands plus SQL over their aliases.
pub fn translate(sql: &str) -> BabelResult<QueryTranslation> {
    let q = sql.trim();
    if q.is_empty() {
        return Ok(QueryTranslation::unchanged(sql));
    }

    if starts_with_ignore_case(q, "http:") || starts_with_ignore_case(q, "https:") {
        return Ok(QueryTranslation::single(
            sql,
            Command::new("", CommandKind::Web.as_str(), vec![q.to_string()]),
        ));
    }

    if BARE_SYMBOL.is_match(q) {
        return Ok(QueryTranslation::single(
            sql,
            Command::new("", CommandKind::Sym.as_str(), vec![q.to_string()]),
        ));
    }

    let mut commands = Vec::new();
    let after_from = rewrite_symbol_tables(q, &mut commands);
    let rewritten = expand_pseudo_functions(&after_from, &mut commands)?;
    debug!(rewritten = %rewritten, commands = commands.len(), "translated query");

    Ok(QueryTranslation {
        original_query: sql.to_string(),
        rewritten_query: Some(rewritten),
        commands,
    })
}

/// Turn a symbol into a usable table alias.
pub fn sanitize_alias(symbol: &str) -> String {
    symbol.replace([':', '-', '.'], "_")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn push_unique(commands: &mut Vec<Command>, command: Command) {
    if !commands.iter().any(|c| c.alias == command.alias) {
        commands.push(command);
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '.')
}

/// `FROM S_<symbol>` becomes `FROM <alias>` plus a `sym` command.
fn rewrite_symbol_tables(sql: &str, commands: &mut Vec<Command>) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;

    while i < chars.len() {
        let at_from = i + 4 < chars.len()
            && chars[i..i + 4]
                .iter()
                .zip("FROM".chars())
                .all(|(a, b)| a.to_ascii_uppercase() == b)
            && chars[i + 4].is_whitespace()
            && (i == 0 || !is_symbol_char(chars[i - 1]));

        if !at_from {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        out.extend(&chars[i..i + 4]);
        i += 4;
        while i < chars.len() && chars[i].is_whitespace() {
            out.push(chars[i]);
            i += 1;
        }
        let start = i;
        while i < chars.len() && is_symbol_char(chars[i]) {
            i += 1;
        }
        let ident: String = chars[start..i].iter().collect();

        match symbol_reference(&ident) {
            Some(symbol) => {
                let alias = sanitize_alias(symbol);
                out.push_str(&alias);
                push_unique(
                    commands,
                    Command::new(alias, CommandKind::Sym.as_str(), vec![symbol.to_string()]),
                );
            }
            None => out.push_str(&ident),
        }
    }

    out
}

/// The symbol named by an `S_`-prefixed identifier longer than the prefix.
fn symbol_reference(ident: &str) -> Option<&str> {
    if ident.chars().count() > SYMBOL_TABLE_PREFIX.len()
        && starts_with_ignore_case(ident, SYMBOL_TABLE_PREFIX)
    {
        Some(&ident[SYMBOL_TABLE_PREFIX.len()..])
    } else {
        None
    }
}

/// Expand every `QUERY_<name>(...)` call.
fn expand_pseudo_functions(sql: &str, commands: &mut Vec<Command>) -> BabelResult<String> {
    let upper = sql.to_ascii_uppercase();
    let starts: Vec<usize> = upper
        .match_indices(PSEUDO_FUNCTION_MARKER)
        .map(|(p, _)| p)
        .collect();
    if starts.is_empty() {
        return Ok(sql.to_string());
    }

    let mut out = String::with_capacity(sql.len());
    out.push_str(&sql[..starts[0]]);

    for (k, &start) in starts.iter().enumerate() {
        let end = starts.get(k + 1).copied().unwrap_or(sql.len());
        let segment = &sql[start + PSEUDO_FUNCTION_MARKER.len()..end];

        let paren = segment
            .find('(')
            .ok_or_else(|| BabelError::MalformedArgumentList(segment.to_string()))?;
        let name = segment[..paren].trim().to_ascii_lowercase();
        let parsed = args::parse_args(&segment[paren..])?;

        if name == CommandKind::Sym.as_str() {
            let mut aliases = Vec::with_capacity(parsed.args.len());
            for arg in parsed.args {
                let alias = sanitize_alias(&arg);
                push_unique(commands, Command::new(alias.clone(), name.clone(), vec![arg]));
                aliases.push(alias);
            }
            out.push_str(&aliases.join(", "));
        } else {
            let alias = format!("{}{}", TEMP_TABLE_PREFIX, commands.len());
            commands.push(Command::new(alias.clone(), name, parsed.args));
            out.push_str(&alias);
        }
        out.push_str(&parsed.remainder);
    }

    Ok(out)
}
