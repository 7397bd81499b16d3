//! A single symbol definition.

use serde::Serialize;

/// One row of the symbol registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    /// Destination that runs [`query`](Self::query). `None` for the
    /// unresolved fallback entry.
    pub database: Option<String>,
    pub symbol: String,
    /// Query template; see [`SymbolEntry::query_to_run`].
    pub query: String,
    pub title: String,
    pub description: String,
}

impl SymbolEntry {
    pub fn new(database: Option<String>, symbol: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            database,
            symbol: symbol.into(),
            query: query.into(),
            title: String::new(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The query with its placeholders filled in.
    ///
    /// | Placeholder       | Replaced by                                   |
    /// |-------------------|-----------------------------------------------|
    /// | `{{XXX}}`, `XXX`  | the symbol                                    |
    /// | `{{SYM}}`         | upper-cased stem (text before the first `_`)  |
    /// | `{{TYP}}`         | lower-cased second `_` segment, or empty      |
    pub fn query_to_run(&self) -> String {
        let (stem, typ) = symbol_parts(&self.symbol);
        self.query
            .replace("{{XXX}}", &self.symbol)
            .replace("XXX", &self.symbol)
            .replace("{{SYM}}", &stem)
            .replace("{{TYP}}", &typ)
    }
}

fn symbol_parts(symbol: &str) -> (String, String) {
    let upper = symbol.trim().to_uppercase();
    match upper.find('_') {
        Some(p) if p > 0 => {
            let mut parts = upper.split('_');
            let stem = parts.next().unwrap_or_default().to_string();
            let typ = parts.next().unwrap_or_default().to_lowercase();
            (stem, typ)
        }
        _ => (upper, String::new()),
    }
}
