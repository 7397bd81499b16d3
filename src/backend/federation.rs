//! Federated sub-queries against the configured `[connections]`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{BackingConnection, ConnectionCache};
use crate::config::{ConnectionConfig, Settings, SettingsError};
use crate::dispatch::FederatedExecutor;
use crate::error::{BabelError, BabelResult};
use crate::table::ColumnarTable;

/// Named destinations reached through a shared [`ConnectionCache`].
///
/// Database ids are matched case-insensitively. Results are never cached
/// here, so any staleness budget is met.
#[derive(Default)]
pub struct ConnectionFederation {
    cache: ConnectionCache,
    databases: BTreeMap<String, ConnectionConfig>,
}

impl ConnectionFederation {
    pub fn new(databases: impl IntoIterator<Item = (String, ConnectionConfig)>) -> Self {
        Self {
            cache: ConnectionCache::new(),
            databases: databases
                .into_iter()
                .map(|(id, config)| (id.to_uppercase(), config))
                .collect(),
        }
    }

    /// Every connection in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let databases = settings
            .connections
            .iter()
            .map(|(id, conn)| Ok((id.clone(), conn.to_config()?)))
            .collect::<Result<Vec<_>, SettingsError>>()?;
        Ok(Self::new(databases))
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    /// Shared connection for `database`, opened on first use.
    pub fn connection(&self, database: &str) -> BabelResult<Arc<dyn BackingConnection>> {
        let id = database.to_uppercase();
        let config = self
            .databases
            .get(&id)
            .ok_or_else(|| BabelError::UnknownDatabase(database.to_string()))?;
        Ok(self.cache.open(&id, config)?)
    }
}

impl FederatedExecutor for ConnectionFederation {
    fn execute(&self, database: &str, query: &str, staleness_ms: u64) -> BabelResult<ColumnarTable> {
        debug!(database, staleness_ms, "federated query");
        Ok(self.connection(database)?.query(query)?)
    }

    fn list_databases_with_symbol_registries(&self) -> BabelResult<Vec<String>> {
        Ok(self.databases.keys().cloned().collect())
    }

    fn database_exists(&self, database: &str) -> bool {
        self.databases.contains_key(&database.to_uppercase())
    }
}
