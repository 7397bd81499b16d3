//! Process-wide symbol registry.
//!
//! The registry is an immutable, sorted snapshot of [`SymbolEntry`] rows
//! behind an [`ArcSwap`]. Readers load the current snapshot without locking;
//! [`SymbolRegistry::refresh`] builds a complete replacement and swaps it in,
//! so a reader sees either the old list or the new one.

mod entry;

pub use entry::SymbolEntry;

use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::dispatch::FederatedExecutor;
use crate::error::BabelResult;
use crate::table::{ColumnData, ColumnarTable, TableError, Value};

/// Query run against each registry-bearing database on refresh.
pub const DEFAULT_SYMBOL_QUERY: &str = "SELECT * FROM SYMBOLS;";

/// Upper bound on search results.
pub const MAX_SEARCH_RESULTS: usize = 100;

static GLOBAL: Lazy<Arc<SymbolRegistry>> = Lazy::new(|| Arc::new(SymbolRegistry::new()));

/// Registry of named queries, looked up by `sym` and `symbols` commands.
#[derive(Debug)]
pub struct SymbolRegistry {
    entries: ArcSwap<Vec<SymbolEntry>>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Registry holding `entries`, sorted by symbol.
    pub fn with_entries(entries: Vec<SymbolEntry>) -> Self {
        let registry = Self::new();
        registry.replace(entries);
        registry
    }

    /// The shared process-wide registry.
    pub fn global() -> Arc<SymbolRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Vec<SymbolEntry>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Swap in a new snapshot.
    pub fn replace(&self, mut entries: Vec<SymbolEntry>) {
        entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        self.entries.store(Arc::new(entries));
    }

    /// Find the entry for `symbol`.
    ///
    /// An exact (upper-cased) match wins, then a `SYMBOL:DATABASE` match
    /// against an entry's symbol and database. Anything else yields an entry
    /// with no database whose query is the symbol itself.
    pub fn resolve(&self, symbol: &str) -> SymbolEntry {
        let upper = symbol.trim().to_uppercase();
        let snapshot = self.entries.load();

        if let Some(found) = snapshot.iter().find(|e| e.symbol == upper) {
            return found.clone();
        }
        if let Some((name, db)) = upper.rsplit_once(':') {
            let found = snapshot.iter().find(|e| {
                e.symbol == name
                    && e.database
                        .as_deref()
                        .is_some_and(|d| d.eq_ignore_ascii_case(db))
            });
            if let Some(found) = found {
                return found.clone();
            }
        }
        SymbolEntry::new(None, symbol, symbol)
    }

    /// Entries matching `prefix`, best first.
    ///
    /// Order: exact symbol match, symbols starting with the prefix, then
    /// (for prefixes of four or more characters) titles containing it. An
    /// empty prefix lists single-character symbols first.
    pub fn search(&self, prefix: &str, limit: usize) -> Vec<SymbolEntry> {
        let q = prefix.trim().to_uppercase();
        let snapshot = self.entries.load();
        let limit = limit.min(MAX_SEARCH_RESULTS);

        let mut picked: Vec<usize> = Vec::new();
        let add = |i: usize, picked: &mut Vec<usize>| {
            if picked.len() < limit && !picked.contains(&i) {
                picked.push(i);
            }
        };

        if q.is_empty() {
            for (i, e) in snapshot.iter().enumerate() {
                if e.symbol.chars().count() == 1 {
                    add(i, &mut picked);
                }
            }
        }
        for (i, e) in snapshot.iter().enumerate() {
            if e.symbol == q {
                add(i, &mut picked);
            }
        }
        for (i, e) in snapshot.iter().enumerate() {
            if e.symbol.starts_with(&q) {
                add(i, &mut picked);
            }
        }
        if q.chars().count() >= 4 {
            for (i, e) in snapshot.iter().enumerate() {
                if e.title.to_uppercase().contains(&q) {
                    add(i, &mut picked);
                }
            }
        }

        picked.into_iter().map(|i| snapshot[i].clone()).collect()
    }

    /// Rebuild the snapshot from every database that carries a registry.
    ///
    /// Each database is asked for `symbol_query` and must return `symbol`
    /// and `query` columns; `title` and `description` are optional. A
    /// database that fails is logged and skipped. If the database list
    /// itself cannot be fetched the current snapshot is kept and the error
    /// returned; if every database fails the current snapshot is kept as
    /// well. Returns the number of entries in the live snapshot.
    pub fn refresh(&self, executor: &dyn FederatedExecutor, symbol_query: &str) -> BabelResult<usize> {
        let databases = executor.list_databases_with_symbol_registries()?;

        let mut entries = Vec::new();
        let mut loaded = 0;
        let mut failed = 0;
        for database in databases {
            let db = database.to_uppercase();
            match executor.execute(&db, symbol_query, 0) {
                Ok(table) => {
                    let before = entries.len();
                    read_entries(&db, &table, &mut entries);
                    loaded += 1;
                    info!(database = %db, added = entries.len() - before, "loaded symbols");
                }
                Err(e) => {
                    failed += 1;
                    warn!(database = %db, error = %e, "could not fetch symbols");
                }
            }
        }

        if loaded == 0 && failed > 0 {
            warn!(failed, "no symbol table could be read, keeping previous snapshot");
            return Ok(self.len());
        }

        let count = entries.len();
        self.replace(entries);
        Ok(count)
    }

    /// The whole snapshot as a table.
    pub fn to_table(&self) -> Result<ColumnarTable, TableError> {
        entries_table(&self.entries.load(), false)
    }
}

fn read_entries(db: &str, table: &ColumnarTable, out: &mut Vec<SymbolEntry>) {
    let (Some(symbol), Some(query)) = (table.column("symbol"), table.column("query")) else {
        warn!(database = %db, "symbol table lacks symbol or query column");
        return;
    };
    let title = table.column("title");
    let description = table.column("description");
    let text = |v: Value| if v.is_null() { String::new() } else { v.to_string() };

    for row in 0..table.row_count() {
        let sym = symbol.get(row);
        if sym.is_null() {
            continue;
        }
        out.push(SymbolEntry {
            database: Some(db.to_string()),
            symbol: sym.to_string().to_uppercase(),
            query: text(query.get(row)),
            title: title.map(|c| text(c.get(row))).unwrap_or_default(),
            description: description.map(|c| text(c.get(row))).unwrap_or_default(),
        });
    }
}

/// Registry rows as a five-column text table. With `resolved` set the query
/// column holds [`SymbolEntry::query_to_run`] instead of the raw template.
pub fn entries_table(entries: &[SymbolEntry], resolved: bool) -> Result<ColumnarTable, TableError> {
    let mut symbol = Vec::with_capacity(entries.len());
    let mut database = Vec::with_capacity(entries.len());
    let mut query = Vec::with_capacity(entries.len());
    let mut title = Vec::with_capacity(entries.len());
    let mut description = Vec::with_capacity(entries.len());

    for e in entries {
        symbol.push(Some(e.symbol.clone()));
        database.push(e.database.clone());
        query.push(Some(if resolved { e.query_to_run() } else { e.query.clone() }));
        title.push(Some(e.title.clone()));
        description.push(Some(e.description.clone()));
    }

    ColumnarTable::new(
        ["symbol", "database", "query", "title", "description"]
            .map(String::from)
            .to_vec(),
        vec![
            ColumnData::Text(symbol),
            ColumnData::Text(database),
            ColumnData::Text(query),
            ColumnData::Text(title),
            ColumnData::Text(description),
        ],
    )
}
