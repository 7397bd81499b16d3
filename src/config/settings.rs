//! TOML-based configuration for BabelDB.
//!
//! Supports a config file (babel.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! dialect = "h2"
//! default_staleness_ms = 60000
//!
//! [registry]
//! symbol_query = "SELECT * FROM SYMBOLS;"
//! max_search_results = 100
//!
//! [connections.local]
//! driver = "sqlite"
//! connection_string = "${HOME}/babel/local.db"
//!
//! [connections.analytics]
//! driver = "duckdb"
//! connection_string = "./data/analytics.duckdb"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{ConnectionConfig, Driver};
use crate::registry::{DEFAULT_SYMBOL_QUERY, MAX_SEARCH_RESULTS};
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Query engine behaviour.
    pub engine: EngineSettings,

    /// Symbol registry refresh and search.
    pub registry: RegistrySettings,

    /// Named backing engine destinations.
    pub connections: HashMap<String, ConnectionSettings>,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Dialect for generated DDL/DML when a connection does not imply one.
    pub dialect: Dialect,

    /// Staleness budget forwarded to federated sub-queries.
    pub default_staleness_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::H2,
            default_staleness_ms: 0,
        }
    }
}

/// Symbol registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Query asked of every database that publishes symbols.
    pub symbol_query: String,

    /// Cap on `symbols` search results.
    pub max_search_results: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            symbol_query: DEFAULT_SYMBOL_QUERY.to_string(),
            max_search_results: MAX_SEARCH_RESULTS,
        }
    }
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Backing engine driver (sqlite, duckdb).
    pub driver: String,

    /// Database path (supports ${ENV_VAR} expansion).
    #[serde(default)]
    pub connection_string: String,

    /// Dialect override; defaults to the driver's dialect.
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        self.driver
            .parse()
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }

    /// Dialect for this connection.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        match self.dialect {
            Some(d) => Ok(d),
            None => Ok(self.driver_type()?.default_dialect()),
        }
    }

    /// Resolve into a [`ConnectionConfig`].
    pub fn to_config(&self) -> Result<ConnectionConfig, SettingsError> {
        Ok(ConnectionConfig {
            driver: self.driver_type()?,
            path: self.resolved_connection_string()?,
        })
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `BABEL_CONFIG`
    /// 2. `./babel.toml`
    /// 3. `~/.config/babel/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("BABEL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("babel.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("babel").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else the first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections
            .iter()
            .min_by_key(|(k, _)| k.as_str())
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }
        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
