//! Shared backing connections, keyed by destination.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use super::{BackendError, BackendResult, BackingConnection, SqliteConnection};
use crate::config::{ConnectionConfig, Driver};

/// Open a backing connection for `config`.
pub fn connect(config: &ConnectionConfig) -> BackendResult<Arc<dyn BackingConnection>> {
    match config.driver {
        Driver::Sqlite => Ok(Arc::new(SqliteConnection::open(config)?)),
        Driver::DuckDb => Err(BackendError::UnsupportedDriver(config.driver.to_string())),
    }
}

/// Process-wide connection map.
///
/// Concurrent first requests for the same id create exactly one
/// connection; later requests share it.
#[derive(Default)]
pub struct ConnectionCache {
    connections: DashMap<String, Arc<dyn BackingConnection>>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached connection for `id`, creating it with `create`
    /// if absent. A failed create leaves the cache unchanged.
    pub fn get_or_try_create<F>(&self, id: &str, create: F) -> BackendResult<Arc<dyn BackingConnection>>
    where
        F: FnOnce() -> BackendResult<Arc<dyn BackingConnection>>,
    {
        match self.connections.entry(id.to_string()) {
            Entry::Occupied(e) => Ok(Arc::clone(e.get())),
            Entry::Vacant(e) => {
                let conn = create()?;
                info!(id, "opened backing connection");
                Ok(Arc::clone(e.insert(conn).value()))
            }
        }
    }

    /// Shared connection for a configured destination.
    pub fn open(&self, id: &str, config: &ConnectionConfig) -> BackendResult<Arc<dyn BackingConnection>> {
        self.get_or_try_create(id, || connect(config))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl std::fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("connections", &self.connections.len())
            .finish()
    }
}
