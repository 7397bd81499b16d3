//! Command execution.
//!
//! A [`Dispatcher`] turns one [`Command`] into a [`ColumnarTable`]. Network
//! access and sub-queries against other databases go through the
//! [`Fetcher`] and [`FederatedExecutor`] collaborators, so the dispatcher
//! itself holds no connections.
//!
//! | Command   | Arguments                       | Source                       |
//! |-----------|---------------------------------|------------------------------|
//! | `web`     | `url[#path[#types]]`            | fetcher + ingestion          |
//! | `data`    | `text[, path[, types]]`         | ingestion                    |
//! | `sym`     | `symbol`                        | registry + executor          |
//! | `symbols` | `prefix`                        | registry search              |
//! | `db`      | `database, query[, staleness]`  | executor                     |

use std::sync::Arc;

use tracing::info;

use crate::error::{BabelError, BabelResult};
use crate::ingest;
use crate::registry::{self, SymbolRegistry, MAX_SEARCH_RESULTS};
use crate::table::ColumnarTable;
use crate::translate::{Command, CommandKind};

/// Blocking text fetch. `None` means the fetch produced no content.
pub trait Fetcher: Send + Sync {
    fn fetch_url(&self, url: &str, method: &str, body: Option<&str>) -> Option<String>;
}

/// Runs queries against named databases.
///
/// `staleness_ms` is the oldest cached result the caller will accept; the
/// executor decides what to do with it.
pub trait FederatedExecutor: Send + Sync {
    fn execute(&self, database: &str, query: &str, staleness_ms: u64) -> BabelResult<ColumnarTable>;

    /// Databases that publish a symbol table.
    fn list_databases_with_symbol_registries(&self) -> BabelResult<Vec<String>>;

    fn database_exists(&self, database: &str) -> bool;
}

/// Executes commands produced by query translation.
pub struct Dispatcher {
    fetcher: Arc<dyn Fetcher>,
    executor: Option<Arc<dyn FederatedExecutor>>,
    registry: Arc<SymbolRegistry>,
    max_search_results: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("has_executor", &self.executor.is_some())
            .field("symbols", &self.registry.len())
            .field("max_search_results", &self.max_search_results)
            .finish()
    }
}

impl Dispatcher {
    /// Dispatcher using the global registry and no federated executor.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            executor: None,
            registry: SymbolRegistry::global(),
            max_search_results: MAX_SEARCH_RESULTS,
        }
    }

    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn FederatedExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SymbolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = max;
        self
    }

    pub fn registry(&self) -> &Arc<SymbolRegistry> {
        &self.registry
    }

    /// Run one command.
    pub fn execute(&self, command: &Command, staleness_ms: u64) -> BabelResult<ColumnarTable> {
        let args = &command.args;
        match command.kind()? {
            CommandKind::Web => {
                if args.is_empty() {
                    return Err(arity(command, "1 or more"));
                }
                self.fetch(&args.join("#"))
            }
            CommandKind::Data => match args.as_slice() {
                [text] => Ok(ingest::from_text(text, None, None, false)?),
                [text, path] => Ok(ingest::from_text(text, Some(path), None, false)?),
                [text, path, types] => Ok(ingest::from_text(text, Some(path), Some(types), false)?),
                _ => Err(arity(command, "1-3")),
            },
            CommandKind::Sym => match args.as_slice() {
                [symbol] => self.run_symbol(symbol, staleness_ms),
                _ => Err(arity(command, "1")),
            },
            CommandKind::Symbols => match args.as_slice() {
                [prefix] => {
                    let found = self.registry.search(prefix, self.max_search_results);
                    Ok(registry::entries_table(&found, true)?)
                }
                _ => Err(arity(command, "1")),
            },
            CommandKind::Db => {
                let (database, query, staleness) = match args.as_slice() {
                    [db, q] => (db, q, staleness_ms),
                    [db, q, s] => {
                        let s = s
                            .trim()
                            .parse::<u64>()
                            .map_err(|_| BabelError::UnsupportedCommand(format!("db staleness {}", s)))?;
                        (db, q, s)
                    }
                    _ => return Err(arity(command, "2 or 3")),
                };
                let executor = self.executor()?;
                if !executor.database_exists(database) {
                    return Err(BabelError::UnknownDatabase(database.clone()));
                }
                executor.execute(database, query, staleness)
            }
        }
    }

    fn executor(&self) -> BabelResult<&dyn FederatedExecutor> {
        self.executor
            .as_deref()
            .ok_or_else(|| BabelError::UnsupportedCommand("no federated executor configured".into()))
    }

    /// `url#path#types`, each part after the URL optional.
    fn fetch(&self, spec: &str) -> BabelResult<ColumnarTable> {
        let mut parts = spec.splitn(3, '#');
        let url = parts.next().unwrap_or_default().trim();
        let path = parts.next().filter(|p| !p.trim().is_empty());
        let types = parts.next().filter(|t| !t.trim().is_empty());

        info!(url, "fetching");
        let body = self
            .fetcher
            .fetch_url(url, "GET", None)
            .ok_or_else(|| BabelError::fetch(format!("no content from {}", url)))?;

        let force_delimited = url.to_ascii_lowercase().contains(".csv");
        Ok(ingest::from_text(&body, path, types, force_delimited)?)
    }

    fn run_symbol(&self, symbol: &str, staleness_ms: u64) -> BabelResult<ColumnarTable> {
        let entry = self.registry.resolve(symbol);
        if let Some(database) = &entry.database {
            return self.executor()?.execute(database, &entry.query_to_run(), staleness_ms);
        }
        if let Some((query, database)) = symbol.split_once(':') {
            return self
                .executor()?
                .execute(&database.to_uppercase(), query, staleness_ms);
        }
        Err(BabelError::UnknownSymbol(symbol.to_string()))
    }
}

fn arity(command: &Command, expected: &str) -> BabelError {
    BabelError::UnsupportedCommand(format!(
        "query_{} takes {} args, got {}",
        command.name,
        expected,
        command.args.len()
    ))
}
