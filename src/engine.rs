//! The query engine: translate, dispatch, materialize, run.

use std::sync::Arc;

use tracing::info;

use crate::backend::{self, BackingConnection};
use crate::config::ConnectionConfig;
use crate::dispatch::{Dispatcher, Fetcher};
use crate::error::BabelResult;
use crate::materialize::materialize;
use crate::table::ColumnarTable;
use crate::translate::{translate, QueryTranslation};

/// Runs queries containing pseudo-functions and symbol references against
/// one backing connection.
///
/// Commands of one query run strictly in order on the same connection.
/// Tables materialized before a failing command stay in place.
pub struct BabelDb {
    connection: Arc<dyn BackingConnection>,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for BabelDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BabelDb")
            .field("dialect", &self.connection.dialect())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl BabelDb {
    pub fn new(connection: Arc<dyn BackingConnection>, dispatcher: Dispatcher) -> Self {
        Self {
            connection,
            dispatcher,
        }
    }

    /// Engine over a freshly opened backing connection.
    pub fn open(config: &ConnectionConfig, fetcher: Arc<dyn Fetcher>) -> BabelResult<Self> {
        let connection = backend::connect(config)?;
        Ok(Self::new(connection, Dispatcher::new(fetcher)))
    }

    pub fn connection(&self) -> &Arc<dyn BackingConnection> {
        &self.connection
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Rewrite `sql` without running anything.
    pub fn translate(&self, sql: &str) -> BabelResult<QueryTranslation> {
        translate(sql)
    }

    /// Run `sql` and return its result.
    ///
    /// A query that is a single command (a URL, a bare symbol, or a lone
    /// pseudo-function) returns the command's table directly.
    pub fn execute(&self, sql: &str, staleness_ms: u64) -> BabelResult<ColumnarTable> {
        if is_registry_query(sql) {
            return Ok(self.dispatcher.registry().to_table()?);
        }

        let translation = translate(sql)?;
        if let Some(command) = translation.bypass_command() {
            return self.dispatcher.execute(command, staleness_ms);
        }

        for command in &translation.commands {
            let table = self.dispatcher.execute(command, staleness_ms)?;
            materialize(&table, &command.alias, self.connection.as_ref())?;
        }

        match translation.rewritten_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                info!(query, commands = translation.commands.len(), "running rewritten query");
                Ok(self.connection.query(query)?)
            }
            _ => Ok(ColumnarTable::empty(Vec::<String>::new())),
        }
    }
}

fn is_registry_query(sql: &str) -> bool {
    let q = sql.trim();
    q == "SYMBOLS" || q.eq_ignore_ascii_case("SELECT * FROM SYMBOLS;")
}
